//! Derive an interface declaration from a `confique` config struct.
//!
//! Each leaf field becomes a method named by its dotted path (`database.url`)
//! backed by an item under the same key. Types and defaults come from the
//! struct's compiled defaults, descriptions from its doc comments.
//!
//! A leaf without a scalar default (no `#[config(default)]`, or an array or
//! table value) is emitted as a method with no item. The registry rejects it
//! in strict mode and skips it in lenient mode.

use confique::Config;
use confique::meta::{FieldKind, Meta};
use serde::Serialize;

use crate::error::StorefigError;
use crate::schema::{InterfaceDecl, ItemDecl};
use crate::value::{Value, ValueType};

/// Build an [`InterfaceDecl`] for `C`, stored under `group`.
pub fn from_config<C: Config + Serialize>(
    id: &str,
    group: &str,
) -> Result<InterfaceDecl, StorefigError> {
    let defaults = C::builder().load()?;
    let table = match toml::Value::try_from(&defaults) {
        Ok(toml::Value::Table(table)) => table,
        Ok(_) => {
            return Err(StorefigError::InvalidValue {
                key: id.into(),
                reason: "config did not serialize to a table".into(),
            });
        }
        Err(e) => {
            return Err(StorefigError::InvalidValue {
                key: id.into(),
                reason: e.to_string(),
            });
        }
    };

    let mut leaves = Vec::new();
    collect_leaves(&C::META, "", &mut leaves);

    let decl = leaves
        .into_iter()
        .fold(InterfaceDecl::new(id).group(group), |decl, (key, doc)| {
            match crate::ops::table_get(&table, &key).and_then(scalar) {
                Some((ty, default)) => {
                    let mut item = ItemDecl::new(&key, ty).default_value(default);
                    if !doc.is_empty() {
                        item = item.description(&doc);
                    }
                    decl.item(&key, item)
                }
                None => decl.method(&key),
            }
        });
    Ok(decl)
}

/// Dotted leaf paths with their joined doc comments, in declaration order.
fn collect_leaves(meta: &Meta, prefix: &str, out: &mut Vec<(String, String)>) {
    for field in meta.fields {
        let key = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        if let FieldKind::Nested { meta: nested, .. } = &field.kind {
            collect_leaves(nested, &key, out);
        } else {
            let doc = field
                .doc
                .iter()
                .map(|line| line.trim())
                .collect::<Vec<_>>()
                .join(" ");
            out.push((key, doc));
        }
    }
}

fn scalar(value: &toml::Value) -> Option<(ValueType, Value)> {
    match value {
        toml::Value::Boolean(b) => Some((ValueType::Bool, Value::Bool(*b))),
        toml::Value::Integer(i) => Some((ValueType::Int, Value::Int(*i))),
        toml::Value::Float(f) => Some((ValueType::Float, Value::Float(*f))),
        toml::Value::String(s) => Some((ValueType::Str, Value::Str(s.clone()))),
        _ => None,
    }
}
