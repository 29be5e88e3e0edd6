//! String wire forms for configuration values.
//!
//! Every [`ValueType`] has one canonical grammar. [`encode`] is total;
//! decoding never fails loudly: malformed input yields `None`, which callers
//! treat exactly like a missing entry.
//!
//! Custom types plug in through [`CustomCodec`], registered by name in a
//! [`Codecs`] table before any item uses them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::value::{Color, Dimension, Point, Rectangle, Value, ValueType};

/// Grammar for a custom value type.
///
/// A custom value is held as its canonical string, so a codec only has to
/// validate raw input and normalize it.
pub trait CustomCodec: Send + Sync {
    /// Returns the canonical form of `raw`, or `None` if it does not parse.
    fn canonicalize(&self, raw: &str) -> Option<String>;
}

impl<F> CustomCodec for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn canonicalize(&self, raw: &str) -> Option<String> {
        self(raw)
    }
}

/// Encode a value into its canonical string form.
pub fn encode(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Str(s) | Value::Enum(s) => s.clone(),
        Value::Duration(d) => d.as_millis().to_string(),
        Value::Color(c) => encode_color(c),
        Value::Dimension(d) => format!("{}x{}", d.width, d.height),
        Value::Point(p) => format!("{}:{}", p.x, p.y),
        Value::Rectangle(r) => format!("{}:{}:{}:{}", r.x, r.y, r.width, r.height),
        Value::Custom { repr, .. } => repr.clone(),
    }
}

fn encode_color(c: &Color) -> String {
    if c.a == u8::MAX {
        format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", c.a, c.r, c.g, c.b)
    }
}

/// Decode `raw` under one of the built-in grammars.
///
/// Always `None` for [`ValueType::Custom`]; use [`Codecs::decode`] for those.
pub fn decode_builtin(raw: &str, ty: &ValueType) -> Option<Value> {
    match ty {
        ValueType::Bool => {
            if raw.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        ValueType::Int => raw.parse::<i64>().ok().map(Value::Int),
        ValueType::Float => raw.parse::<f64>().ok().map(Value::Float),
        ValueType::Str => Some(Value::Str(raw.to_string())),
        ValueType::Enum(variants) => variants
            .iter()
            .find(|v| **v == raw)
            .map(|v| Value::Enum((*v).to_string())),
        ValueType::Duration => raw
            .parse::<u64>()
            .ok()
            .map(|ms| Value::Duration(Duration::from_millis(ms))),
        ValueType::Color => decode_color(raw).map(Value::Color),
        ValueType::Dimension => {
            let (w, h) = raw.split_once('x')?;
            Some(Value::Dimension(Dimension {
                width: w.parse().ok()?,
                height: h.parse().ok()?,
            }))
        }
        ValueType::Point => {
            let [x, y] = split_fields::<2>(raw)?;
            Some(Value::Point(Point {
                x: x.parse().ok()?,
                y: y.parse().ok()?,
            }))
        }
        ValueType::Rectangle => {
            let [x, y, w, h] = split_fields::<4>(raw)?;
            Some(Value::Rectangle(Rectangle {
                x: x.parse().ok()?,
                y: y.parse().ok()?,
                width: w.parse().ok()?,
                height: h.parse().ok()?,
            }))
        }
        ValueType::Custom(_) => None,
    }
}

/// Split a `:`-separated string into exactly `N` fields.
fn split_fields<const N: usize>(raw: &str) -> Option<[&str; N]> {
    let mut out = [""; N];
    let mut parts = raw.split(':');
    for slot in &mut out {
        *slot = parts.next()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(out),
    }
}

fn decode_color(raw: &str) -> Option<Color> {
    let hex = raw.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
        _ => None,
    }
}

/// The set of value types a registry can declare items with.
///
/// Built-in types are always present; custom types must be registered here
/// before an item may use them.
#[derive(Clone, Default)]
pub struct Codecs {
    custom: HashMap<&'static str, Arc<dyn CustomCodec>>,
}

impl Codecs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the grammar for [`ValueType::Custom(name)`](ValueType::Custom).
    /// A later registration under the same name replaces the earlier one.
    pub fn register(&mut self, name: &'static str, codec: impl CustomCodec + 'static) {
        self.custom.insert(name, Arc::new(codec));
    }

    /// Whether values of `ty` can be encoded and decoded.
    pub fn supports(&self, ty: &ValueType) -> bool {
        match ty {
            ValueType::Custom(name) => self.custom.contains_key(name),
            _ => true,
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CustomCodec>> {
        self.custom.get(name).cloned()
    }

    /// Decode `raw` as a value of type `ty`. `None` if it does not parse or
    /// `ty` names an unregistered custom type.
    pub fn decode(&self, raw: &str, ty: &ValueType) -> Option<Value> {
        match ty {
            ValueType::Custom(name) => decode_custom(name, self.custom.get(name)?.as_ref(), raw),
            builtin => decode_builtin(raw, builtin),
        }
    }
}

pub(crate) fn decode_custom(name: &str, codec: &dyn CustomCodec, raw: &str) -> Option<Value> {
    codec.canonicalize(raw).map(|repr| Value::Custom {
        kind: name.to_string(),
        repr,
    })
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&&str> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("Codecs").field("custom", &names).finish()
    }
}
