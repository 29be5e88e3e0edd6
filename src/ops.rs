//! Config operations: listing, key lookup, set/unset by key, template
//! generation, and result types.
//!
//! Provides the logic behind `config list`, `config get`, `config set`,
//! `config unset` and `config gen`, and the `ConfigResult` enum that callers
//! use to display results. Everything goes through the accessor, so `set`
//! collapses defaults and fires change events exactly like typed access does.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::accessor::ConfigAccessor;
use crate::codec;
use crate::defaults::default_of;
use crate::error::{AccessError, StorefigError};
use crate::schema::{ItemDescriptor, SchemaRegistry};

const NOT_SET: &str = "<not set>";

/// One line of `config list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub key: String,
    pub value: String,
    /// Whether the store holds an override for this item.
    pub overridden: bool,
}

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A generated TOML template string.
    Template(String),
    /// Confirmation that a template was written to a file.
    TemplateWritten { path: PathBuf },
    /// A key's effective value and its description.
    KeyValue {
        key: String,
        value: String,
        doc: Vec<String>,
    },
    /// Confirmation that a value was stored. `value` is the canonical form.
    ValueSet { key: String, value: String },
    /// Confirmation that a value was removed.
    ValueUnset { key: String },
    /// Every registered item with its effective value.
    Listing { entries: Vec<ListEntry> },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Template(t) => write!(f, "{t}"),
            ConfigResult::TemplateWritten { path } => {
                write!(f, "Config template written to {}", path.display())
            }
            ConfigResult::KeyValue { key, value, doc } => {
                for line in doc {
                    writeln!(f, "# {line}")?;
                }
                write!(f, "{key} = {value}")
            }
            ConfigResult::ValueSet { key, value } => write!(f, "Set {key} = {value}"),
            ConfigResult::ValueUnset { key } => write!(f, "Unset {key}"),
            ConfigResult::Listing { entries } => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{} = {}", entry.key, entry.value)?;
                    if entry.overridden {
                        write!(f, " (set)")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Look up an item by (group, key).
fn find_item(
    accessor: &ConfigAccessor,
    group: &str,
    key: &str,
) -> Result<Arc<ItemDescriptor>, StorefigError> {
    accessor
        .registry()
        .by_key(group, key)
        .ok_or_else(|| StorefigError::KeyNotFound(format!("{group}.{key}")))
}

/// The effective value of an item in its stored string form.
fn effective(accessor: &ConfigAccessor, item: &ItemDescriptor) -> Result<String, AccessError> {
    Ok(accessor
        .get_item(item)?
        .map(|v| codec::encode(&v))
        .unwrap_or_else(|| NOT_SET.to_string()))
}

/// List every registered item, optionally restricted to one group.
pub fn list_values(
    accessor: &ConfigAccessor,
    group: Option<&str>,
) -> Result<ConfigResult, StorefigError> {
    let items = accessor.registry().items();
    let mut entries = Vec::new();
    for item in items
        .iter()
        .filter(|item| group.is_none_or(|g| item.group == g))
    {
        let stored = accessor.stored(item)?;
        let value = match effective(accessor, item) {
            Ok(value) => value,
            Err(AccessError::DefaultInvocation { reason, .. }) => {
                format!("<default unavailable: {reason}>")
            }
            Err(e) => return Err(e.into()),
        };
        entries.push(ListEntry {
            key: item.qualified_key(),
            value,
            overridden: stored.is_some_and(|raw| item.decode(&raw).is_some()),
        });
    }
    Ok(ConfigResult::Listing { entries })
}

/// Get an item's effective value, including its description.
pub fn get_value(
    accessor: &ConfigAccessor,
    group: &str,
    key: &str,
) -> Result<ConfigResult, StorefigError> {
    let item = find_item(accessor, group, key)?;
    let value = effective(accessor, &item)?;
    let doc = item
        .description
        .as_deref()
        .map(|d| d.lines().map(str::to_string).collect())
        .unwrap_or_default();
    Ok(ConfigResult::KeyValue {
        key: item.qualified_key(),
        value,
        doc,
    })
}

/// Decode `raw` under the item's declared type and set it.
///
/// Setting an item to its default removes the stored entry.
pub fn set_value(
    accessor: &ConfigAccessor,
    group: &str,
    key: &str,
    raw: &str,
) -> Result<ConfigResult, StorefigError> {
    let item = find_item(accessor, group, key)?;
    let value = item.decode(raw).ok_or_else(|| StorefigError::InvalidValue {
        key: item.qualified_key(),
        reason: format!("'{raw}' is not a valid {}", item.value_type),
    })?;
    accessor.set_item(&item, std::slice::from_ref(&value))?;
    Ok(ConfigResult::ValueSet {
        key: item.qualified_key(),
        value: codec::encode(&value),
    })
}

/// Remove an item's stored override.
pub fn unset_value(
    accessor: &ConfigAccessor,
    group: &str,
    key: &str,
) -> Result<ConfigResult, StorefigError> {
    let item = find_item(accessor, group, key)?;
    accessor.unset_item(&item)?;
    Ok(ConfigResult::ValueUnset {
        key: item.qualified_key(),
    })
}

/// Generate a commented TOML template of every registered item.
///
/// Every entry is commented out, so the template is a valid store file that
/// overrides nothing.
pub fn generate_template(registry: &SchemaRegistry) -> String {
    let mut out = String::new();
    let items = registry.items();
    for group in registry.groups() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("[{}]\n", toml_edit::Key::new(group.as_str())));
        for item in items.iter().filter(|i| i.group == group) {
            if let Some(name) = &item.name {
                out.push_str(&format!("# {name}\n"));
            }
            if let Some(description) = &item.description {
                for line in description.lines() {
                    out.push_str(&format!("# {line}\n"));
                }
            }
            out.push_str(&format!("# Type: {}\n", item.value_type));
            let key = toml_edit::Key::new(item.key.as_str());
            match default_of(item) {
                Ok(Some(value)) => {
                    let encoded = toml::Value::String(codec::encode(&value));
                    out.push_str(&format!("# {key} = {encoded}\n"));
                }
                _ => out.push_str(&format!("# {key} =\n")),
            }
            out.push('\n');
        }
    }
    out.trim_end().to_string() + "\n"
}

/// Navigate a `toml::Table` by dotted key path (e.g. `"database.url"`).
pub fn table_get<'a>(table: &'a toml::Table, dotted_key: &str) -> Option<&'a toml::Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let tbl = match path {
        Some(path) => {
            let mut current = table;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => table,
    };

    tbl.get(leaf)
}
