//! Schema registry: the dispatch table from interface methods to items.
//!
//! A configuration interface is declared with an [`InterfaceDecl`]: an id, a
//! group, and one entry per accessor method naming the item it reads and
//! writes. [`SchemaRegistry::register`] validates the declaration once and
//! turns it into immutable [`ItemDescriptor`]s that the accessor resolves
//! every call against.
//!
//! Structural problems (no group, duplicate keys, unknown value types) always
//! fail registration. A method that declares no item fails registration in
//! strict mode and is skipped with a warning otherwise; calls to a skipped
//! method later degrade to "no value".

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::codec::{self, Codecs, CustomCodec};
use crate::error::SchemaError;
use crate::value::{ConfigValue, Value, ValueType};

/// A default-value provider. Pure: it must not touch the store or accessor.
pub type DefaultFn = Arc<dyn Fn() -> Result<Value, String> + Send + Sync>;

/// Declaration of a single configuration item.
#[derive(Clone)]
pub struct ItemDecl {
    key: String,
    value_type: ValueType,
    default: Option<DefaultFn>,
    name: Option<String>,
    description: Option<String>,
}

impl ItemDecl {
    pub fn new(key: &str, value_type: ValueType) -> Self {
        Self {
            key: key.to_string(),
            value_type,
            default: None,
            name: None,
            description: None,
        }
    }

    /// Declare an item typed after `T`.
    pub fn of<T: ConfigValue>(key: &str) -> Self {
        Self::new(key, T::value_type())
    }

    /// Use a constant default.
    pub fn default<T>(self, value: T) -> Self
    where
        T: ConfigValue + Clone + Send + Sync + 'static,
    {
        self.default_with(move || value.clone())
    }

    /// Compute the default on demand.
    pub fn default_with<T, F>(mut self, f: F) -> Self
    where
        T: ConfigValue,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(move || Ok(f().into_value())));
        self
    }

    /// Compute the default with a provider that may fail. A failure surfaces
    /// as [`AccessError::DefaultInvocation`](crate::AccessError::DefaultInvocation)
    /// on the call that needed it.
    pub fn try_default_with<T, E, F>(mut self, f: F) -> Self
    where
        T: ConfigValue,
        E: fmt::Display,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(move || {
            f().map(ConfigValue::into_value).map_err(|e| e.to_string())
        }));
        self
    }

    /// Use an untyped constant default.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(Arc::new(move || Ok(value.clone())));
        self
    }

    /// Human-readable name, for UIs.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

impl fmt::Debug for ItemDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemDecl")
            .field("key", &self.key)
            .field("value_type", &self.value_type)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
struct MethodDecl {
    id: String,
    item: Option<ItemDecl>,
}

/// Declaration of a configuration interface: a group plus its methods.
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    id: String,
    group: Option<String>,
    methods: Vec<MethodDecl>,
}

impl InterfaceDecl {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            group: None,
            methods: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the group every item of this interface is stored under.
    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    /// Add an accessor method backed by `item`.
    pub fn item(mut self, method: &str, item: ItemDecl) -> Self {
        self.methods.push(MethodDecl {
            id: method.to_string(),
            item: Some(item),
        });
        self
    }

    /// Add an accessor method that declares no item.
    pub fn method(mut self, method: &str) -> Self {
        self.methods.push(MethodDecl {
            id: method.to_string(),
            item: None,
        });
        self
    }
}

/// A configuration interface declared in code.
///
/// ```ignore
/// struct BoostsConfig;
///
/// impl ConfigInterface for BoostsConfig {
///     const NAME: &'static str = "BoostsConfig";
///
///     fn declare(decl: InterfaceDecl) -> InterfaceDecl {
///         decl.group("boosts")
///             .item("enable_skill", ItemDecl::of::<bool>("enableSkill").default(true))
///     }
/// }
/// ```
pub trait ConfigInterface {
    const NAME: &'static str;

    fn declare(decl: InterfaceDecl) -> InterfaceDecl;

    fn interface() -> InterfaceDecl {
        Self::declare(InterfaceDecl::new(Self::NAME))
    }
}

/// Resolved metadata for one item. Immutable once registered.
pub struct ItemDescriptor {
    pub interface: String,
    pub method: String,
    pub group: String,
    pub key: String,
    pub value_type: ValueType,
    pub name: Option<String>,
    pub description: Option<String>,
    default: Option<DefaultFn>,
    codec: Option<Arc<dyn CustomCodec>>,
}

impl ItemDescriptor {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub(crate) fn default_provider(&self) -> Option<&DefaultFn> {
        self.default.as_ref()
    }

    /// Decode a stored string under this item's declared type.
    pub fn decode(&self, raw: &str) -> Option<Value> {
        match (&self.value_type, &self.codec) {
            (ValueType::Custom(name), Some(codec)) => {
                codec::decode_custom(name, codec.as_ref(), raw)
            }
            (ty, _) => codec::decode_builtin(raw, ty),
        }
    }

    /// Check that `value` fits this item and bring it into canonical form:
    /// the value its stored encoding decodes back to.
    pub fn normalize(&self, value: &Value) -> Option<Value> {
        if !value.conforms_to(&self.value_type) {
            return None;
        }
        match value {
            Value::Custom { repr, .. } => self.decode(repr),
            Value::Duration(d) => {
                let millis = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
                Some(Value::Duration(Duration::from_millis(millis)))
            }
            other => Some(other.clone()),
        }
    }

    /// `group.key`, as shown to users.
    pub fn qualified_key(&self) -> String {
        format!("{}.{}", self.group, self.key)
    }
}

impl fmt::Debug for ItemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemDescriptor")
            .field("interface", &self.interface)
            .field("method", &self.method)
            .field("group", &self.group)
            .field("key", &self.key)
            .field("value_type", &self.value_type)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// A registered interface: its group and the method → item mapping.
#[derive(Debug)]
pub struct Interface {
    pub id: String,
    pub group: String,
    items: Vec<Arc<ItemDescriptor>>,
}

impl Interface {
    pub fn item(&self, method: &str) -> Option<&Arc<ItemDescriptor>> {
        self.items.iter().find(|i| i.method == method)
    }

    /// Items in declaration order.
    pub fn items(&self) -> &[Arc<ItemDescriptor>] {
        &self.items
    }
}

/// Table of every registered interface and the codecs items may use.
#[derive(Debug)]
pub struct SchemaRegistry {
    strict: bool,
    codecs: Codecs,
    interfaces: HashMap<String, Arc<Interface>>,
    keys: BTreeMap<(String, String), Arc<ItemDescriptor>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SchemaRegistry {
    pub fn new(strict: bool) -> Self {
        Self::with_codecs(strict, Codecs::new())
    }

    pub fn with_codecs(strict: bool, codecs: Codecs) -> Self {
        Self {
            strict,
            codecs,
            interfaces: HashMap::new(),
            keys: BTreeMap::new(),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn codecs(&self) -> &Codecs {
        &self.codecs
    }

    /// Register a custom codec. Only affects interfaces registered afterwards.
    pub fn register_codec(&mut self, name: &'static str, codec: impl CustomCodec + 'static) {
        self.codecs.register(name, codec);
    }

    /// Validate `decl` and add it to the table.
    ///
    /// Nothing is added unless the whole declaration is accepted.
    pub fn register(&mut self, decl: InterfaceDecl) -> Result<Arc<Interface>, SchemaError> {
        let InterfaceDecl { id, group, methods } = decl;

        if self.interfaces.contains_key(&id) {
            return Err(SchemaError::DuplicateInterface(id));
        }
        let Some(group) = group else {
            return Err(SchemaError::MissingGroup { interface: id });
        };

        let mut seen_methods = HashSet::new();
        let mut seen_keys: HashMap<String, String> = HashMap::new();
        let mut items = Vec::with_capacity(methods.len());

        for MethodDecl { id: method, item } in methods {
            if !seen_methods.insert(method.clone()) {
                return Err(SchemaError::DuplicateMethod {
                    interface: id,
                    method,
                });
            }

            let Some(item) = item else {
                if self.strict {
                    return Err(SchemaError::MissingItem {
                        interface: id,
                        method,
                    });
                }
                warn!(interface = %id, method = %method, "Configuration method has no item; skipping");
                continue;
            };

            if let Some(owner) = self.keys.get(&(group.clone(), item.key.clone())) {
                return Err(SchemaError::DuplicateKey {
                    group,
                    key: item.key,
                    interface: owner.interface.clone(),
                    method: owner.method.clone(),
                });
            }
            if let Some(owner) = seen_keys.get(&item.key) {
                return Err(SchemaError::DuplicateKey {
                    group,
                    key: item.key,
                    interface: id.clone(),
                    method: owner.clone(),
                });
            }

            let codec = self.codec_for(&group, &item)?;
            seen_keys.insert(item.key.clone(), method.clone());

            items.push(Arc::new(ItemDescriptor {
                interface: id.clone(),
                method,
                group: group.clone(),
                key: item.key,
                value_type: item.value_type,
                name: item.name,
                description: item.description,
                default: item.default,
                codec,
            }));
        }

        for item in &items {
            self.keys
                .insert((item.group.clone(), item.key.clone()), Arc::clone(item));
        }
        let interface = Arc::new(Interface {
            id: id.clone(),
            group,
            items,
        });
        self.interfaces.insert(id, Arc::clone(&interface));
        Ok(interface)
    }

    /// Register an interface declared with [`ConfigInterface`].
    pub fn register_interface<I: ConfigInterface>(&mut self) -> Result<Arc<Interface>, SchemaError> {
        self.register(I::interface())
    }

    /// Check the item's value type against the codec table, returning the
    /// custom codec it binds to, if any.
    fn codec_for(
        &self,
        group: &str,
        item: &ItemDecl,
    ) -> Result<Option<Arc<dyn CustomCodec>>, SchemaError> {
        match item.value_type {
            ValueType::Enum([]) => Err(SchemaError::EmptyEnum {
                group: group.to_string(),
                key: item.key.clone(),
            }),
            ValueType::Custom(name) => match self.codecs.get(name) {
                Some(codec) => Ok(Some(codec)),
                None => Err(SchemaError::UnknownType {
                    group: group.to_string(),
                    key: item.key.clone(),
                    type_name: name.to_string(),
                }),
            },
            _ => Ok(None),
        }
    }

    /// Remove an interface, releasing its keys.
    pub fn unregister(&mut self, id: &str) -> Option<Arc<Interface>> {
        let interface = self.interfaces.remove(id)?;
        for item in &interface.items {
            self.keys.remove(&(item.group.clone(), item.key.clone()));
        }
        Some(interface)
    }

    pub fn interface(&self, id: &str) -> Option<Arc<Interface>> {
        self.interfaces.get(id).cloned()
    }

    /// Resolve an (interface, method) pair to its item.
    pub fn lookup(&self, interface: &str, method: &str) -> Result<Arc<ItemDescriptor>, SchemaError> {
        let iface = self
            .interfaces
            .get(interface)
            .ok_or_else(|| SchemaError::UnknownInterface(interface.to_string()))?;
        iface
            .item(method)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownMethod {
                interface: interface.to_string(),
                method: method.to_string(),
            })
    }

    /// Resolve a (group, key) pair to its item.
    pub fn by_key(&self, group: &str, key: &str) -> Option<Arc<ItemDescriptor>> {
        self.keys.get(&(group.to_string(), key.to_string())).cloned()
    }

    /// Every registered item, ordered by group then key.
    pub fn items(&self) -> Vec<Arc<ItemDescriptor>> {
        self.keys.values().cloned().collect()
    }

    /// Registered groups, sorted.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.interfaces.values().map(|i| i.group.clone()).collect();
        groups.sort();
        groups.dedup();
        groups
    }
}
