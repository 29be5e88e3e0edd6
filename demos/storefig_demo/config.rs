//! Configuration interfaces for the demo app.

use std::time::Duration;

use confique::Config;
use serde::{Deserialize, Serialize};
use storefig::{AccessError, Color, ConfigInterface, ConfigProxy, Dimension, InterfaceDecl, ItemDecl};

storefig::config_enum! {
    /// How boosts are laid out.
    pub enum Layout { Compact, Wide }
}

/// Display settings, declared by hand.
pub struct DisplayConfig;

impl ConfigInterface for DisplayConfig {
    const NAME: &'static str = "DisplayConfig";

    fn declare(decl: InterfaceDecl) -> InterfaceDecl {
        decl.group("display")
            .item(
                "enabled",
                ItemDecl::of::<bool>("enabled")
                    .default(true)
                    .description("Show the overlay."),
            )
            .item(
                "max_items",
                ItemDecl::of::<i64>("maxItems")
                    .default(10i64)
                    .name("Max items")
                    .description("How many entries to show at once."),
            )
            .item(
                "layout",
                ItemDecl::of::<Layout>("layout").default(Layout::Compact),
            )
            .item(
                "accent",
                ItemDecl::of::<Color>("accent")
                    .default(Color::rgb(0xff, 0xcc, 0x00))
                    .description("Highlight color."),
            )
            .item(
                "size",
                ItemDecl::of::<Dimension>("size").default(Dimension {
                    width: 240,
                    height: 120,
                }),
            )
            .item(
                "refresh",
                ItemDecl::of::<Duration>("refresh")
                    .default(Duration::from_millis(600))
                    .description("Delay between redraws."),
            )
            .item(
                "hotkey",
                ItemDecl::new("hotkey", storefig::ValueType::Custom("keybind"))
                    .description("Toggle the overlay."),
            )
    }
}

/// Typed wrapper over the display proxy.
pub struct Display<'a>(pub ConfigProxy<'a>);

impl Display<'_> {
    pub fn enabled(&self) -> Result<bool, AccessError> {
        Ok(self.0.get("enabled")?.unwrap_or(true))
    }

    pub fn max_items(&self) -> Result<i64, AccessError> {
        Ok(self.0.get("max_items")?.unwrap_or(10))
    }

    pub fn layout(&self) -> Result<Layout, AccessError> {
        Ok(self.0.get("layout")?.unwrap_or(Layout::Compact))
    }

    pub fn accent(&self) -> Result<Option<Color>, AccessError> {
        self.0.get("accent")
    }

    pub fn refresh(&self) -> Result<Option<Duration>, AccessError> {
        self.0.get("refresh")
    }
}

/// Canonical keybind form: modifiers in fixed order, then one uppercase key.
pub fn keybind(raw: &str) -> Option<String> {
    const MODIFIERS: [&str; 3] = ["ctrl", "shift", "alt"];
    let mut mods = [false; 3];
    let mut key = None;
    for part in raw.split('+').map(str::trim) {
        let lower = part.to_ascii_lowercase();
        match MODIFIERS.iter().position(|m| *m == lower) {
            Some(i) => mods[i] = true,
            None if key.is_none() && !part.is_empty() => key = Some(part.to_ascii_uppercase()),
            None => return None,
        }
    }
    let mut parts: Vec<&str> = MODIFIERS
        .iter()
        .zip(mods)
        .filter_map(|(m, on)| on.then_some(*m))
        .collect();
    let key = key?;
    parts.push(&key);
    Some(parts.join("+"))
}

/// Server settings, derived from a confique struct.
#[derive(Config, Serialize, Deserialize, Debug)]
pub struct ServerConfig {
    /// Address to bind.
    #[config(default = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[config(default = 8080)]
    pub port: u16,

    #[config(nested)]
    pub limits: LimitsConfig,
}

#[derive(Config, Serialize, Deserialize, Debug)]
pub struct LimitsConfig {
    /// Maximum simultaneous connections.
    #[config(default = 64)]
    pub max_connections: u32,
}
