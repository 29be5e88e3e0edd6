#[cfg(test)]
pub mod test {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, RwLock};
    use std::time::Duration;

    use confique::Config;
    use serde::{Deserialize, Serialize};

    use crate::accessor::ConfigAccessor;
    use crate::error::StoreError;
    use crate::notify::{ChangeListener, ConfigChanged};
    use crate::schema::{ConfigInterface, InterfaceDecl, ItemDecl, SchemaRegistry};
    use crate::store::{ConfigStore, MemoryStore};

    crate::config_enum! {
        pub enum Mode { Fast, Slow }
    }

    /// The interface most tests run against.
    pub struct BoostsConfig;

    impl ConfigInterface for BoostsConfig {
        const NAME: &'static str = "BoostsConfig";

        fn declare(decl: InterfaceDecl) -> InterfaceDecl {
            decl.group("boosts")
                .item(
                    "enable_skill",
                    ItemDecl::of::<bool>("enableSkill")
                        .default(true)
                        .description("Show skill boosts."),
                )
                .item(
                    "max_items",
                    ItemDecl::of::<i64>("maxItems")
                        .default(10i64)
                        .name("Max items")
                        .description("How many boosts to display."),
                )
                .item("mode", ItemDecl::of::<Mode>("mode").default(Mode::Fast))
                .item(
                    "change_interval",
                    ItemDecl::of::<Duration>("changeInterval")
                        .default(Duration::from_secs(1)),
                )
                .item("nickname", ItemDecl::of::<String>("nickname"))
                .item(
                    "broken",
                    ItemDecl::of::<i64>("broken")
                        .try_default_with(|| Err::<i64, _>("default unavailable")),
                )
        }
    }

    /// Canonical keybind form: modifiers in fixed order, then one uppercase key.
    pub fn keybind_codec(raw: &str) -> Option<String> {
        const MODIFIERS: [&str; 4] = ["ctrl", "shift", "alt", "meta"];

        let mut mods = [false; 4];
        let mut key = None;
        for part in raw.split('+').map(str::trim) {
            if part.is_empty() {
                return None;
            }
            let lower = part.to_ascii_lowercase();
            match MODIFIERS.iter().position(|m| *m == lower) {
                Some(i) => mods[i] = true,
                None if key.is_none() => key = Some(part.to_ascii_uppercase()),
                None => return None,
            }
        }

        let mut parts: Vec<String> = MODIFIERS
            .iter()
            .zip(mods)
            .filter(|(_, on)| *on)
            .map(|(m, _)| m.to_string())
            .collect();
        parts.push(key?);
        Some(parts.join("+"))
    }

    /// A memory store that counts calls and can be told to refuse writes.
    #[derive(Default)]
    pub struct RecordingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
        mutations: AtomicUsize,
        fail_writes: AtomicBool,
    }

    impl RecordingStore {
        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        pub fn mutations(&self) -> usize {
            self.mutations.load(Ordering::SeqCst)
        }

        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Peek at the stored string without counting a read.
        pub fn raw(&self, group: &str, key: &str) -> Option<String> {
            self.inner.get_configuration(group, key).unwrap()
        }

        /// Write an entry behind the accessor's back.
        pub fn seed(&self, group: &str, key: &str, value: &str) {
            self.inner.set_configuration(group, key, value).unwrap();
        }

        fn check_writable(&self) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Rejected("store is read-only".into()));
            }
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl ConfigStore for RecordingStore {
        fn get_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_configuration(group, key)
        }

        fn set_configuration(
            &self,
            group: &str,
            key: &str,
            value: &str,
        ) -> Result<Option<String>, StoreError> {
            self.check_writable()?;
            self.inner.set_configuration(group, key, value)
        }

        fn unset_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
            self.check_writable()?;
            self.inner.unset_configuration(group, key)
        }
    }

    #[derive(Default)]
    pub struct RecordingListener {
        events: Mutex<Vec<ConfigChanged>>,
    }

    impl RecordingListener {
        pub fn events(&self) -> Vec<ConfigChanged> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ChangeListener for RecordingListener {
        fn on_config_changed(&self, event: &ConfigChanged) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    /// An accessor over `store` with [`BoostsConfig`] registered.
    pub fn accessor_with<S: ConfigStore + 'static>(
        store: Arc<S>,
        listener: Arc<RecordingListener>,
    ) -> ConfigAccessor {
        let mut registry = SchemaRegistry::new(true);
        registry.register_interface::<BoostsConfig>().unwrap();
        ConfigAccessor::new(store, Arc::new(RwLock::new(registry))).with_listener(listener)
    }

    // -- confique structs for derived interfaces --------------------------------

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct TestConfig {
        /// The application host.
        #[config(default = "localhost")]
        pub host: String,

        /// The port number.
        #[config(default = 8080)]
        pub port: u16,

        /// Enable debug mode.
        #[config(default = false)]
        pub debug: bool,

        /// Render scale.
        #[config(default = 1.5)]
        pub scale: f64,

        /// Database settings.
        #[config(nested)]
        pub database: TestDbConfig,
    }

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct TestDbConfig {
        /// Connection string URL.
        pub url: Option<String>,

        /// Connection pool size.
        #[config(default = 5)]
        pub pool_size: usize,
    }

    #[test]
    fn test_config_loads_defaults() {
        let config = TestConfig::builder().load().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert!(!config.debug);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.pool_size, 5);
    }

    #[test]
    fn keybind_codec_orders_modifiers() {
        assert_eq!(keybind_codec("shift+CTRL+k").as_deref(), Some("ctrl+shift+K"));
        assert_eq!(keybind_codec("K+ctrl").as_deref(), Some("ctrl+K"));
        assert_eq!(keybind_codec(""), None);
        assert_eq!(keybind_codec("ctrl+"), None);
        assert_eq!(keybind_codec("a+b"), None);
        assert_eq!(keybind_codec("ctrl"), None);
    }
}
