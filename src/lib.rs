//! Typed configuration interfaces over a string key/value store.
//!
//! Declare a configuration interface once (a group plus one item per
//! setting, each with a key, a value type and an optional default) and read
//! and write it through typed calls. Storefig turns every call into a single
//! store round trip:
//!
//! ```ignore
//! let manager = ConfigManager::builder()
//!     .app_name("myapp")
//!     .store_path(StorePath::Platform)
//!     .interface::<BoostsConfig>()
//!     .build()?;
//!
//! let boosts = manager.config::<BoostsConfig>();
//! let max: Option<i64> = boosts.get("max_items")?;
//! boosts.set("max_items", 7i64)?;
//! ```
//!
//! # Declaring interfaces
//!
//! An interface is a [`ConfigInterface`] implementation or a hand-built
//! [`InterfaceDecl`]. Each method names one [`ItemDecl`]:
//!
//! ```ignore
//! struct BoostsConfig;
//!
//! impl ConfigInterface for BoostsConfig {
//!     const NAME: &'static str = "BoostsConfig";
//!
//!     fn declare(decl: InterfaceDecl) -> InterfaceDecl {
//!         decl.group("boosts")
//!             .item("enable_skill", ItemDecl::of::<bool>("enableSkill").default(true))
//!             .item("max_items", ItemDecl::of::<i64>("maxItems").default(10i64))
//!     }
//! }
//! ```
//!
//! A `confique` config struct can stand in for a hand-written declaration:
//! [`ConfigManager::register_config`] turns every leaf into an item, with the
//! struct's `#[config(default)]` values as defaults and its doc comments as
//! descriptions.
//!
//! Registration validates the declaration once. A missing group, a duplicate
//! key, an enum with no variants or an unregistered custom type always fail.
//! A method without an item fails in strict mode (the default) and is skipped
//! with a warning otherwise.
//!
//! # Values and codecs
//!
//! The store only holds strings. Each item's [`ValueType`] picks the grammar:
//!
//! | Type | Stored form |
//! |---|---|
//! | bool, int, float, string | `true`, `42`, `1.5`, text as-is |
//! | enum | variant name |
//! | duration | whole milliseconds |
//! | color | `#rrggbb`, or `#aarrggbb` when not opaque |
//! | dimension | `800x600` |
//! | point | `10:20` |
//! | rectangle | `10:20:800:600` |
//!
//! Application-specific types register a [`CustomCodec`] under a name and
//! declare items as `ValueType::Custom(name)`. [`config_enum!`] declares Rust
//! enums that map onto enum items.
//!
//! # Reads and writes
//!
//! - A read returns the stored value if it decodes, else the default. A
//!   stored value that fails to decode is logged and ignored.
//! - A write of the default removes the stored entry, so the store only ever
//!   holds real overrides. A later change to the default then applies to
//!   every user who never changed the setting.
//! - Each successful write or removal fires one [`ConfigChanged`] to every
//!   registered [`ChangeListener`].
//!
//! Nothing is cached. Two threads writing the same key race exactly as the
//! store lets them.
//!
//! # Stores
//!
//! Anything implementing [`ConfigStore`] works. Two are provided:
//! [`MemoryStore`] for tests and ephemeral settings, and [`TomlFileStore`],
//! one TOML table per group, which keeps comments and layout intact across
//! edits. [`StorePath`] picks the file's directory; the name defaults to
//! `{app_name}.toml`.
//!
//! # Operations and CLI
//!
//! [`ConfigManager::handle`] runs a framework-agnostic [`ConfigAction`]
//! (`list`, `get`, `set`, `unset`, `gen`) and returns a displayable
//! [`ConfigResult`]. With the `clap` feature (on by default), [`ConfigArgs`]
//! provides the matching subcommands:
//!
//! ```toml
//! storefig = { version = "...", default-features = false }
//! ```
//!
//! # Errors
//!
//! Registration fails with [`SchemaError`]. Calls fail with [`AccessError`]
//! only for wrong arguments, failing default providers and store failures;
//! everything recoverable degrades to a logged warning. Manager and
//! operation calls wrap both in [`StorefigError`].

pub mod error;
pub mod types;

mod accessor;
mod builder;
#[cfg(feature = "clap")]
mod cli;
mod codec;
mod defaults;
mod file;
mod from_config;
mod notify;
mod ops;
mod persist;
mod schema;
mod store;
mod value;

#[cfg(test)]
mod fixtures;

pub use accessor::{ConfigAccessor, ConfigProxy};
pub use builder::{ConfigManager, ConfigManagerBuilder};
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use codec::{Codecs, CustomCodec};
pub use defaults::default_of;
pub use error::{AccessError, SchemaError, StoreError, StorefigError};
pub use from_config::from_config;
pub use notify::{ChangeListener, ConfigChanged};
pub use ops::{ConfigResult, ListEntry};
pub use persist::TomlFileStore;
pub use schema::{
    ConfigInterface, DefaultFn, Interface, InterfaceDecl, ItemDecl, ItemDescriptor,
    SchemaRegistry,
};
pub use store::{ConfigStore, MemoryStore};
pub use types::{ConfigAction, StorePath};
pub use value::{Color, ConfigValue, Dimension, Point, Rectangle, Value, ValueType};
