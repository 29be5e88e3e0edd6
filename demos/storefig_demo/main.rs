//! # storefig demo application
//!
//! A sample CLI tool that shows how an application wires up
//! [storefig](https://docs.rs/storefig). It exists purely to demonstrate and
//! manually verify storefig's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example storefig_demo -- show
//! cargo run --example storefig_demo -- config list
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                | How to exercise it                                                       |
//! |------------------------|--------------------------------------------------------------------------|
//! | Defaults               | `cargo run --example storefig_demo -- show`                              |
//! | Typed set              | `cargo run --example storefig_demo -- bump`                              |
//! | `config set`           | `cargo run --example storefig_demo -- config set display maxItems 4`     |
//! | Default collapse       | `cargo run --example storefig_demo -- config set display maxItems 10`    |
//! | Custom codec           | `cargo run --example storefig_demo -- config set display hotkey K+ctrl`  |
//! | Derived interface      | `cargo run --example storefig_demo -- config get server limits.max_connections` |
//! | `config gen`           | `cargo run --example storefig_demo -- config gen`                        |
//! | Change log             | `RUST_LOG=storefig=debug,storefig_demo=info cargo run --example storefig_demo -- bump` |
//!
//! Settings are stored in `storefig-demo.toml` in the working directory, or
//! in the platform config directory with `--global`.

mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use storefig::{ConfigArgs, ConfigChanged, ConfigManager, StorePath, StorefigError};
use tracing_subscriber::EnvFilter;

use config::{Display, DisplayConfig, ServerConfig};

/// storefig demo: a sample CLI app for showcasing storefig integration.
#[derive(Parser, Debug)]
#[command(name = "storefig-demo")]
struct Cli {
    /// Use the platform config directory instead of the working directory.
    #[arg(long, global = true)]
    global: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the display settings through the typed interface.
    Show,
    /// Increase `display.maxItems` by one.
    Bump,
    /// Manage stored settings (list, get, set, unset, gen).
    Config(ConfigArgs),
}

fn make_manager(cli: &Cli) -> Result<ConfigManager, StorefigError> {
    let store_path = if cli.global {
        StorePath::Platform
    } else {
        StorePath::Cwd
    };

    let manager = ConfigManager::builder()
        .app_name("storefig-demo")
        .store_path(store_path)
        .codec("keybind", config::keybind)
        .listener(Arc::new(|event: &ConfigChanged| {
            tracing::info!(
                group = %event.group,
                key = %event.key,
                old = ?event.old_value,
                new = ?event.new_value,
                "Setting changed"
            );
        }))
        .interface::<DisplayConfig>()
        .build()?;
    manager.register_config::<ServerConfig>("ServerConfig", "server")?;
    Ok(manager)
}

fn show(manager: &ConfigManager) -> Result<(), StorefigError> {
    let display = Display(manager.config::<DisplayConfig>());
    println!("enabled   {}", display.enabled()?);
    println!("max items {}", display.max_items()?);
    println!("layout    {}", display.layout()?.as_str());
    if let Some(accent) = display.accent()? {
        println!(
            "accent    rgb({}, {}, {}) alpha {}",
            accent.r, accent.g, accent.b, accent.a
        );
    }
    if let Some(refresh) = display.refresh()? {
        println!("refresh   {refresh:?}");
    }
    Ok(())
}

fn bump(manager: &ConfigManager) -> Result<(), StorefigError> {
    let display = Display(manager.config::<DisplayConfig>());
    let next = display.max_items()?.saturating_add(1);
    display.0.set("max_items", next)?;
    println!("max items {next}");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = make_manager(&cli).and_then(|manager| match cli.command {
        Commands::Show => show(&manager),
        Commands::Bump => bump(&manager),
        Commands::Config(args) => manager.handle_and_print(&args.into_action()),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
