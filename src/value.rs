//! Configuration values and the type tags they are declared with.
//!
//! [`ValueType`] is the closed set of types an item can be declared with;
//! [`Value`] is the matching tagged union the accessor moves around. Rust
//! types reach the accessor through [`ConfigValue`], which is implemented for
//! the primitives, the composite types below, and any enum declared with
//! [`config_enum!`](crate::config_enum).

use std::fmt;
use std::time::Duration;

/// Declared type of a configuration item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Str,
    /// Enumeration by variant name.
    Enum(&'static [&'static str]),
    /// Millisecond resolution.
    Duration,
    Color,
    Dimension,
    Point,
    Rectangle,
    /// A type backed by a codec registered under this name.
    Custom(&'static str),
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "string",
            ValueType::Enum(_) => "enum",
            ValueType::Duration => "duration",
            ValueType::Color => "color",
            ValueType::Dimension => "dimension",
            ValueType::Point => "point",
            ValueType::Rectangle => "rectangle",
            ValueType::Custom(name) => name,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Enum(variants) => write!(f, "enum({})", variants.join("|")),
            other => f.write_str(other.name()),
        }
    }
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: u8::MAX }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A configuration value of one of the supported types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// The variant name of an enumeration.
    Enum(String),
    Duration(Duration),
    Color(Color),
    Dimension(Dimension),
    Point(Point),
    Rectangle(Rectangle),
    /// A value of a custom type, held in its canonical string form.
    Custom { kind: String, repr: String },
}

impl Value {
    /// Whether this value can be stored in an item declared as `ty`.
    pub fn conforms_to(&self, ty: &ValueType) -> bool {
        match (self, ty) {
            (Value::Bool(_), ValueType::Bool)
            | (Value::Int(_), ValueType::Int)
            | (Value::Float(_), ValueType::Float)
            | (Value::Str(_), ValueType::Str)
            | (Value::Duration(_), ValueType::Duration)
            | (Value::Color(_), ValueType::Color)
            | (Value::Dimension(_), ValueType::Dimension)
            | (Value::Point(_), ValueType::Point)
            | (Value::Rectangle(_), ValueType::Rectangle) => true,
            (Value::Enum(name), ValueType::Enum(variants)) => variants.contains(&name.as_str()),
            (Value::Custom { kind, .. }, ValueType::Custom(expected)) => kind == expected,
            _ => false,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Enum(_) => "enum",
            Value::Duration(_) => "duration",
            Value::Color(_) => "color",
            Value::Dimension(_) => "dimension",
            Value::Point(_) => "point",
            Value::Rectangle(_) => "rectangle",
            Value::Custom { kind, .. } => kind,
        }
    }
}

/// Displays the canonical wire form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::encode(self))
    }
}

/// A Rust type that can be read from and written to a configuration item.
pub trait ConfigValue: Sized {
    /// The type tag items of this type are declared with.
    fn value_type() -> ValueType;

    fn into_value(self) -> Value;

    /// Returns `None` when `value` is not of this type.
    fn from_value(value: Value) -> Option<Self>;
}

impl ConfigValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl ConfigValue for i64 {
    fn value_type() -> ValueType {
        ValueType::Int
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }
}

/// Narrower integers share the `Int` wire type; out-of-range stored values
/// read as absent.
macro_rules! narrow_int {
    ($($ty:ty),+) => {
        $(
            impl ConfigValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::Int
                }

                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i).ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

narrow_int!(i32, u32, u16, u8);

impl ConfigValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }
}

impl ConfigValue for String {
    fn value_type() -> ValueType {
        ValueType::Str
    }

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl ConfigValue for Duration {
    fn value_type() -> ValueType {
        ValueType::Duration
    }

    /// Truncates to whole milliseconds, the resolution durations are stored at.
    fn into_value(self) -> Value {
        Value::Duration(Duration::from_millis(
            u64::try_from(self.as_millis()).unwrap_or(u64::MAX),
        ))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Duration(d) => Some(d),
            _ => None,
        }
    }
}

macro_rules! composite {
    ($($ty:ident),+) => {
        $(
            impl ConfigValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::$ty
                }

                fn into_value(self) -> Value {
                    Value::$ty(self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$ty(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )+
    };
}

composite!(Color, Dimension, Point, Rectangle);

/// Declare a fieldless enum usable as a configuration value.
///
/// Variants are stored by name. The macro derives `Debug`, `Clone`, `Copy`,
/// `PartialEq`, `Eq` and `Hash`, and adds `VARIANTS` and `as_str()`.
///
/// ```ignore
/// storefig::config_enum! {
///     pub enum Mode { Fast, Slow }
/// }
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const VARIANTS: &'static [&'static str] = &[$(stringify!($variant)),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl $crate::ConfigValue for $name {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Enum(Self::VARIANTS)
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::Enum(self.as_str().to_string())
            }

            fn from_value(value: $crate::Value) -> Option<Self> {
                match value {
                    $crate::Value::Enum(name) => match name.as_str() {
                        $(stringify!($variant) => Some(Self::$variant),)+
                        _ => None,
                    },
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::config_enum! {
        enum Speed { Fast, Slow }
    }

    #[test]
    fn enum_conformance_checks_variant_names() {
        let ty = ValueType::Enum(&["Fast", "Slow"]);
        assert!(Value::Enum("Fast".into()).conforms_to(&ty));
        assert!(!Value::Enum("fast".into()).conforms_to(&ty));
        assert!(!Value::Str("Fast".into()).conforms_to(&ty));
    }

    #[test]
    fn custom_conformance_checks_kind() {
        let v = Value::Custom {
            kind: "keybind".into(),
            repr: "ctrl+K".into(),
        };
        assert!(v.conforms_to(&ValueType::Custom("keybind")));
        assert!(!v.conforms_to(&ValueType::Custom("hotkey")));
    }

    #[test]
    fn config_enum_converts_by_name() {
        assert_eq!(Speed::value_type(), ValueType::Enum(&["Fast", "Slow"]));
        assert_eq!(Speed::Slow.into_value(), Value::Enum("Slow".into()));
        assert_eq!(
            Speed::from_value(Value::Enum("Fast".into())),
            Some(Speed::Fast)
        );
        assert_eq!(Speed::from_value(Value::Enum("Medium".into())), None);
    }

    #[test]
    fn narrow_int_rejects_out_of_range() {
        assert_eq!(u16::from_value(Value::Int(8080)), Some(8080));
        assert_eq!(u16::from_value(Value::Int(70_000)), None);
        assert_eq!(u32::from_value(Value::Int(-1)), None);
    }

    #[test]
    fn duration_truncates_to_millis() {
        let v = Duration::from_micros(1_500_700).into_value();
        assert_eq!(v, Value::Duration(Duration::from_millis(1_500)));
    }

    #[test]
    fn type_display_lists_enum_variants() {
        assert_eq!(ValueType::Enum(&["A", "B"]).to_string(), "enum(A|B)");
        assert_eq!(ValueType::Point.to_string(), "point");
    }
}
