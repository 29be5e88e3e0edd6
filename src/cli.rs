//! Clap adapter for storefig.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! [`ConfigArgs`] and [`ConfigSubcommand`] embed into an application's clap
//! `#[derive(Parser)]` struct and give it `config list|get|set|unset|gen`.
//!
//! The only bridge to the core is [`ConfigArgs::into_action()`], which
//! converts clap-parsed arguments into a [`ConfigAction`](crate::ConfigAction)
//! for [`ConfigManager::handle()`](crate::ConfigManager::handle). Callers
//! using another parser can build `ConfigAction` values directly.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::ConfigAction;

/// Clap-derived args for the `config` subcommand group.
///
/// Embed this into your app's clap derive:
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
///
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show every configuration item and its effective value.
    List {
        /// Only show items in this group.
        group: Option<String>,
    },
    /// Generate a commented sample configuration file.
    Gen {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the effective value and description of an item.
    Get {
        /// Group the item is stored under (e.g. "boosts").
        group: String,
        /// Item key within the group (e.g. "maxItems").
        key: String,
    },
    /// Store a value for an item. Setting the default removes the entry.
    Set {
        group: String,
        key: String,
        /// Value in the item's text form (e.g. "7", "#ff0000", "800x600").
        value: String,
    },
    /// Remove an item's stored value so it reads as its default.
    Unset { group: String, key: String },
}

impl ConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Bare `config` (no subcommand) lists everything.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None => ConfigAction::List { group: None },
            Some(ConfigSubcommand::List { group }) => ConfigAction::List { group },
            Some(ConfigSubcommand::Gen { output }) => ConfigAction::Gen { output },
            Some(ConfigSubcommand::Get { group, key }) => ConfigAction::Get { group, key },
            Some(ConfigSubcommand::Set { group, key, value }) => {
                ConfigAction::Set { group, key, value }
            }
            Some(ConfigSubcommand::Unset { group, key }) => ConfigAction::Unset { group, key },
        }
    }
}
