//! The configuration accessor: typed reads and writes over a string store.
//!
//! Every call resolves its item through the [`SchemaRegistry`], then does one
//! store round trip:
//!
//! - **get** reads the entry and decodes it. A missing or undecodable entry
//!   yields the item's default.
//! - **set** compares the new value to the default. Equal values remove the
//!   entry; anything else is stored in its encoded form. Either way one
//!   [`ConfigChanged`] goes to every listener once the store has accepted
//!   the change.
//!
//! Nothing is cached between calls, so concurrent writers race exactly as the
//! store lets them.
//!
//! Schema misses and decode failures are logged and degrade to "no value".
//! Wrong arity, mistyped arguments and failing default providers are
//! returned as [`AccessError`]s, as are store failures.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tracing::{debug, warn};

use crate::codec;
use crate::defaults::default_of;
use crate::error::AccessError;
use crate::notify::{ChangeListener, ConfigChanged};
use crate::schema::{ConfigInterface, ItemDescriptor, SchemaRegistry};
use crate::store::ConfigStore;
use crate::value::{ConfigValue, Value};

#[derive(Clone)]
pub struct ConfigAccessor {
    store: Arc<dyn ConfigStore>,
    registry: Arc<RwLock<SchemaRegistry>>,
    listeners: Vec<Arc<dyn ChangeListener>>,
}

impl ConfigAccessor {
    pub fn new(store: Arc<dyn ConfigStore>, registry: Arc<RwLock<SchemaRegistry>>) -> Self {
        Self {
            store,
            registry,
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    /// Registration is all-or-nothing and descriptors are immutable, so a
    /// poisoned lock still holds a consistent table.
    pub(crate) fn registry(&self) -> RwLockReadGuard<'_, SchemaRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve an item, logging and returning `None` when the schema has no
    /// entry for it.
    fn resolve(&self, interface: &str, method: &str) -> Option<Arc<ItemDescriptor>> {
        match self.registry().lookup(interface, method) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(interface, method, error = %e, "Configuration access without schema");
                None
            }
        }
    }

    /// Read an item by (interface, method).
    pub fn get(&self, interface: &str, method: &str) -> Result<Option<Value>, AccessError> {
        match self.resolve(interface, method) {
            Some(item) => self.get_item(&item),
            None => Ok(None),
        }
    }

    /// Write an item by (interface, method). `args` must hold exactly one value.
    pub fn set(&self, interface: &str, method: &str, args: &[Value]) -> Result<(), AccessError> {
        match self.resolve(interface, method) {
            Some(item) => self.set_item(&item, args),
            None => Ok(()),
        }
    }

    /// Read an item: the stored override if it decodes, else the default.
    pub fn get_item(&self, item: &ItemDescriptor) -> Result<Option<Value>, AccessError> {
        if let Some(raw) = self.store.get_configuration(&item.group, &item.key)? {
            match item.decode(&raw) {
                Some(value) => return Ok(Some(value)),
                None => warn!(
                    group = %item.group,
                    key = %item.key,
                    value = %raw,
                    expected = %item.value_type,
                    "Unable to decode stored configuration value; using default"
                ),
            }
        }
        default_of(item)
    }

    /// Write an item, collapsing a write of the default into an unset.
    pub fn set_item(&self, item: &ItemDescriptor, args: &[Value]) -> Result<(), AccessError> {
        let [value] = args else {
            return Err(AccessError::Argument {
                group: item.group.clone(),
                key: item.key.clone(),
                reason: format!("expected exactly 1 argument, got {}", args.len()),
            });
        };

        let value = item.normalize(value).ok_or_else(|| AccessError::Argument {
            group: item.group.clone(),
            key: item.key.clone(),
            reason: format!(
                "expected a value of type {}, got {} '{}'",
                item.value_type,
                value.type_name(),
                value
            ),
        })?;

        // Compared by stored form, so NaN and other non-reflexive values
        // still collapse onto an equal default.
        let encoded = codec::encode(&value);
        if default_of(item)?.map(|d| codec::encode(&d)).as_ref() == Some(&encoded) {
            return self.unset_item(item);
        }

        let old_value = self
            .store
            .set_configuration(&item.group, &item.key, &encoded)?;
        debug!(group = %item.group, key = %item.key, value = %encoded, "Configuration set");

        self.notify(ConfigChanged {
            group: item.group.clone(),
            key: item.key.clone(),
            old_value,
            new_value: Some(encoded),
        });
        Ok(())
    }

    /// Remove an item's override so it reads as its default again.
    pub fn unset_item(&self, item: &ItemDescriptor) -> Result<(), AccessError> {
        let old_value = self.store.unset_configuration(&item.group, &item.key)?;
        debug!(group = %item.group, key = %item.key, "Configuration unset");

        self.notify(ConfigChanged {
            group: item.group.clone(),
            key: item.key.clone(),
            old_value,
            new_value: None,
        });
        Ok(())
    }

    /// The raw stored string for an item, bypassing decoding and defaults.
    pub fn stored(&self, item: &ItemDescriptor) -> Result<Option<String>, AccessError> {
        Ok(self.store.get_configuration(&item.group, &item.key)?)
    }

    fn notify(&self, event: ConfigChanged) {
        for listener in &self.listeners {
            listener.on_config_changed(&event);
        }
    }

    /// A view of this accessor bound to one interface.
    pub fn proxy(&self, interface: &str) -> ConfigProxy<'_> {
        ConfigProxy {
            accessor: self,
            interface: interface.to_string(),
        }
    }

    pub fn proxy_for<I: ConfigInterface>(&self) -> ConfigProxy<'_> {
        self.proxy(I::NAME)
    }
}

/// Typed access to the items of one interface.
///
/// Wrap one in a struct with a method per setting to get a typed
/// configuration interface:
///
/// ```ignore
/// struct Boosts<'a>(ConfigProxy<'a>);
///
/// impl Boosts<'_> {
///     fn max_items(&self) -> Result<i64, AccessError> {
///         Ok(self.0.get("max_items")?.unwrap_or_default())
///     }
/// }
/// ```
pub struct ConfigProxy<'a> {
    accessor: &'a ConfigAccessor,
    interface: String,
}

impl ConfigProxy<'_> {
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Read a method's value as `T`. `None` when nothing is configured or the
    /// value is not a `T`.
    pub fn get<T: ConfigValue>(&self, method: &str) -> Result<Option<T>, AccessError> {
        let Some(value) = self.accessor.get(&self.interface, method)? else {
            return Ok(None);
        };
        let type_name = value.type_name().to_string();
        let converted = T::from_value(value);
        if converted.is_none() {
            warn!(
                interface = %self.interface,
                method,
                actual = %type_name,
                requested = %T::value_type(),
                "Configuration value does not match the requested type"
            );
        }
        Ok(converted)
    }

    pub fn set<T: ConfigValue>(&self, method: &str, value: T) -> Result<(), AccessError> {
        self.accessor
            .set(&self.interface, method, &[value.into_value()])
    }

    /// Untyped set; arity is checked like any other call.
    pub fn set_args(&self, method: &str, args: &[Value]) -> Result<(), AccessError> {
        self.accessor.set(&self.interface, method, args)
    }

    /// Reset a method's item to its default.
    pub fn unset(&self, method: &str) -> Result<(), AccessError> {
        match self.accessor.resolve(&self.interface, method) {
            Some(item) => self.accessor.unset_item(&item),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::fixtures::test::{
        BoostsConfig, Mode, RecordingListener, RecordingStore, accessor_with,
    };
    use crate::persist::TomlFileStore;
    use crate::schema::{InterfaceDecl, ItemDecl};
    use crate::store::MemoryStore;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup() -> (ConfigAccessor, Arc<RecordingStore>, Arc<RecordingListener>) {
        let store = Arc::new(RecordingStore::default());
        let listener = Arc::new(RecordingListener::default());
        let accessor = accessor_with(store.clone(), listener.clone());
        (accessor, store, listener)
    }

    #[test]
    fn absent_key_falls_back_to_default() {
        let (accessor, store, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        assert_eq!(proxy.get::<i64>("max_items").unwrap(), Some(10));
        assert_eq!(store.reads(), 1);
    }

    #[test]
    fn max_items_scenario() {
        let (accessor, store, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();

        assert_eq!(proxy.get::<i64>("max_items").unwrap(), Some(10));

        proxy.set("max_items", 7i64).unwrap();
        assert_eq!(store.raw("boosts", "maxItems").as_deref(), Some("7"));
        assert_eq!(proxy.get::<i64>("max_items").unwrap(), Some(7));

        proxy.set("max_items", 10i64).unwrap();
        assert_eq!(store.raw("boosts", "maxItems"), None);
        assert_eq!(proxy.get::<i64>("max_items").unwrap(), Some(10));

        let err = proxy.set_args("max_items", &[]).unwrap_err();
        assert!(matches!(err, AccessError::Argument { .. }));
    }

    #[test]
    fn too_many_arguments_is_argument_error() {
        let (accessor, store, listener) = setup();
        let err = accessor
            .set("BoostsConfig", "max_items", &[Value::Int(1), Value::Int(2)])
            .unwrap_err();
        match err {
            AccessError::Argument { reason, .. } => assert!(reason.contains("got 2")),
            other => panic!("Expected Argument, got {other:?}"),
        }
        assert_eq!(store.mutations(), 0);
        assert!(listener.events().is_empty());
    }

    #[test]
    fn mistyped_argument_is_argument_error() {
        let (accessor, _, _) = setup();
        let err = accessor
            .set("BoostsConfig", "max_items", &[Value::Str("7".into())])
            .unwrap_err();
        assert!(matches!(err, AccessError::Argument { .. }));
    }

    #[test]
    fn setting_default_leaves_no_entry() {
        let (accessor, store, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        proxy.set("enable_skill", true).unwrap();
        assert_eq!(store.raw("boosts", "enableSkill"), None);
        assert_eq!(proxy.get::<bool>("enable_skill").unwrap(), Some(true));
    }

    #[test]
    fn override_is_stored_encoded() {
        let (accessor, store, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        proxy.set("mode", Mode::Slow).unwrap();
        proxy
            .set("change_interval", Duration::from_millis(2_500))
            .unwrap();
        assert_eq!(store.raw("boosts", "mode").as_deref(), Some("Slow"));
        assert_eq!(
            store.raw("boosts", "changeInterval").as_deref(),
            Some("2500")
        );
        assert_eq!(proxy.get::<Mode>("mode").unwrap(), Some(Mode::Slow));
        assert_eq!(
            proxy.get::<Duration>("change_interval").unwrap(),
            Some(Duration::from_millis(2_500))
        );
    }

    #[test]
    fn sub_millisecond_default_collapses() {
        let (accessor, store, listener) = setup();
        accessor
            .set(
                "BoostsConfig",
                "change_interval",
                &[Value::Duration(Duration::from_micros(1_000_400))],
            )
            .unwrap();
        assert_eq!(store.raw("boosts", "changeInterval"), None);
        assert_eq!(listener.events()[0].new_value, None);
    }

    #[test]
    fn nan_default_collapses() {
        let store = Arc::new(RecordingStore::default());
        let mut registry = SchemaRegistry::new(true);
        registry
            .register(
                InterfaceDecl::new("Gauge")
                    .group("gauge")
                    .item("level", ItemDecl::of::<f64>("level").default(f64::NAN)),
            )
            .unwrap();
        let accessor = ConfigAccessor::new(store.clone(), Arc::new(RwLock::new(registry)));

        accessor
            .set("Gauge", "level", &[Value::Float(f64::NAN)])
            .unwrap();
        assert_eq!(store.raw("gauge", "level"), None);

        accessor.set("Gauge", "level", &[Value::Float(0.5)]).unwrap();
        assert_eq!(store.raw("gauge", "level").as_deref(), Some("0.5"));
    }

    #[test]
    fn toml_array_entry_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "[boosts]\nmaxItems = [1, 2]\nenableSkill = false\n").unwrap();
        let accessor = accessor_with(
            Arc::new(TomlFileStore::new(&path)),
            Arc::new(RecordingListener::default()),
        );
        let proxy = accessor.proxy_for::<BoostsConfig>();
        assert_eq!(proxy.get::<i64>("max_items").unwrap(), Some(10));
        assert_eq!(proxy.get::<bool>("enable_skill").unwrap(), Some(false));

        proxy.set("max_items", 4i64).unwrap();
        assert_eq!(proxy.get::<i64>("max_items").unwrap(), Some(4));
    }

    #[test]
    fn malformed_stored_value_reads_as_default() {
        let (accessor, store, _) = setup();
        store.seed("boosts", "maxItems", "lots");
        let proxy = accessor.proxy_for::<BoostsConfig>();
        assert_eq!(proxy.get::<i64>("max_items").unwrap(), Some(10));
    }

    #[test]
    fn item_without_default_reads_as_absent() {
        let (accessor, _, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        assert_eq!(proxy.get::<String>("nickname").unwrap(), None);
    }

    #[test]
    fn item_without_default_always_writes() {
        let (accessor, store, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        proxy.set("nickname", String::new()).unwrap();
        assert_eq!(store.raw("boosts", "nickname").as_deref(), Some(""));
    }

    #[test]
    fn set_notifies_once_with_old_and_new() {
        let (accessor, _, listener) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();

        proxy.set("max_items", 7i64).unwrap();
        assert_eq!(
            listener.events(),
            vec![ConfigChanged {
                group: "boosts".into(),
                key: "maxItems".into(),
                old_value: None,
                new_value: Some("7".into()),
            }]
        );

        proxy.set("max_items", 10i64).unwrap();
        let events = listener.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].old_value.as_deref(), Some("7"));
        assert_eq!(events[1].new_value, None);
    }

    #[test]
    fn set_is_one_mutation() {
        let (accessor, store, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        proxy.set("max_items", 7i64).unwrap();
        proxy.set("max_items", 10i64).unwrap();
        assert_eq!(store.mutations(), 2);
        assert_eq!(store.reads(), 0);
    }

    #[test]
    fn store_failure_propagates_without_notification() {
        let (accessor, store, listener) = setup();
        store.fail_writes(true);
        let proxy = accessor.proxy_for::<BoostsConfig>();

        let err = proxy.set("max_items", 7i64).unwrap_err();
        assert!(matches!(err, AccessError::Store(StoreError::Rejected(_))));
        let err = proxy.set("max_items", 10i64).unwrap_err();
        assert!(matches!(err, AccessError::Store(_)));
        assert!(listener.events().is_empty());
    }

    #[test]
    fn failing_default_is_fatal_on_set_and_get() {
        let (accessor, store, listener) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();

        assert!(matches!(
            proxy.set("broken", 3i64),
            Err(AccessError::DefaultInvocation { .. })
        ));
        assert_eq!(store.mutations(), 0);
        assert!(listener.events().is_empty());

        assert!(matches!(
            proxy.get::<i64>("broken"),
            Err(AccessError::DefaultInvocation { .. })
        ));

        // A stored override never needs the default.
        store.seed("boosts", "broken", "3");
        assert_eq!(proxy.get::<i64>("broken").unwrap(), Some(3));
    }

    #[test]
    fn unknown_interface_degrades_to_no_value() {
        let (accessor, store, listener) = setup();
        assert_eq!(accessor.get("Missing", "anything").unwrap(), None);
        accessor
            .set("Missing", "anything", &[Value::Int(1)])
            .unwrap();
        assert_eq!(store.reads() + store.mutations(), 0);
        assert!(listener.events().is_empty());
    }

    #[test]
    fn unknown_method_degrades_to_no_value() {
        let (accessor, _, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        assert_eq!(proxy.get::<bool>("no_such_method").unwrap(), None);
        proxy.unset("no_such_method").unwrap();
    }

    #[test]
    fn typed_get_with_wrong_type_is_none() {
        let (accessor, _, _) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        assert_eq!(proxy.get::<bool>("max_items").unwrap(), None);
    }

    #[test]
    fn unset_resets_to_default() {
        let (accessor, store, listener) = setup();
        let proxy = accessor.proxy_for::<BoostsConfig>();
        proxy.set("max_items", 3i64).unwrap();
        proxy.unset("max_items").unwrap();
        assert_eq!(store.raw("boosts", "maxItems"), None);
        assert_eq!(proxy.get::<i64>("max_items").unwrap(), Some(10));
        assert_eq!(listener.events().len(), 2);
    }

    #[test]
    fn concurrent_sets_land_in_store() {
        let store = Arc::new(MemoryStore::new());
        let accessor = Arc::new(accessor_with(
            store.clone(),
            Arc::new(RecordingListener::default()),
        ));
        let handles: Vec<_> = (1..=4i64)
            .map(|i| {
                let accessor = Arc::clone(&accessor);
                std::thread::spawn(move || {
                    accessor
                        .proxy_for::<BoostsConfig>()
                        .set("max_items", i)
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let value = accessor
            .proxy_for::<BoostsConfig>()
            .get::<i64>("max_items")
            .unwrap()
            .unwrap();
        assert!((1..=4).contains(&value));
    }
}
