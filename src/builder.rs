use std::sync::{Arc, PoisonError, RwLock};

use confique::Config;
use serde::Serialize;

use crate::accessor::{ConfigAccessor, ConfigProxy};
use crate::codec::{Codecs, CustomCodec};
use crate::error::StorefigError;
use crate::file;
use crate::from_config::from_config;
use crate::notify::ChangeListener;
use crate::ops::{self, ConfigResult};
use crate::persist::TomlFileStore;
use crate::schema::{ConfigInterface, Interface, InterfaceDecl, SchemaRegistry};
use crate::store::ConfigStore;
use crate::types::{ConfigAction, StorePath};

/// Builder for a [`ConfigManager`].
///
/// Exactly one storage source is needed:
///
/// - [`store()`](Self::store): any [`ConfigStore`] implementation.
/// - [`store_path()`](Self::store_path): a [`TomlFileStore`] at
///   `{dir}/{file_name}`, where `file_name` defaults to `"{app_name}.toml"`.
///
/// An explicit store wins over a store path.
pub struct ConfigManagerBuilder {
    app_name: Option<String>,
    file_name: Option<String>,
    store_path: Option<StorePath>,
    store: Option<Arc<dyn ConfigStore>>,
    strict: bool,
    listeners: Vec<Arc<dyn ChangeListener>>,
    codecs: Codecs,
    interfaces: Vec<InterfaceDecl>,
}

impl ConfigManagerBuilder {
    fn new() -> Self {
        Self {
            app_name: None,
            file_name: None,
            store_path: None,
            store: None,
            strict: true,
            listeners: Vec::new(),
            codecs: Codecs::new(),
            interfaces: Vec::new(),
        }
    }

    /// Set the application name. Derives `file_name` → `"{app_name}.toml"` and
    /// names the platform config directory.
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the store file name (default: `"{app_name}.toml"`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Store configuration in a TOML file under this directory.
    pub fn store_path(mut self, path: StorePath) -> Self {
        self.store_path = Some(path);
        self
    }

    /// Use a caller-supplied store.
    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Enable or disable strict registration (default: `true`).
    /// In strict mode, a method that declares no item fails registration;
    /// otherwise it is skipped with a warning.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Notify `listener` after every successful set or unset.
    pub fn listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Register the grammar for a custom value type.
    pub fn codec(mut self, name: &'static str, codec: impl CustomCodec + 'static) -> Self {
        self.codecs.register(name, codec);
        self
    }

    /// Register an interface when the manager is built.
    pub fn interface<I: ConfigInterface>(mut self) -> Self {
        self.interfaces.push(I::interface());
        self
    }

    /// Register a hand-built declaration when the manager is built.
    pub fn declare(mut self, decl: InterfaceDecl) -> Self {
        self.interfaces.push(decl);
        self
    }

    /// Resolve the effective app name, or error if not set.
    fn effective_app_name(&self) -> Result<&str, StorefigError> {
        self.app_name
            .as_deref()
            .ok_or(StorefigError::AppNameRequired)
    }

    /// Resolve the effective file name.
    fn effective_file_name(&self) -> Result<String, StorefigError> {
        if let Some(name) = &self.file_name {
            return Ok(name.clone());
        }
        let app = self.effective_app_name()?;
        Ok(format!("{app}.toml"))
    }

    fn effective_store(&self) -> Result<Arc<dyn ConfigStore>, StorefigError> {
        if let Some(store) = &self.store {
            return Ok(Arc::clone(store));
        }
        let store_path = self.store_path.as_ref().ok_or(StorefigError::NoStore)?;
        let file_name = self.effective_file_name()?;
        let app_name = match store_path {
            StorePath::Platform => self.effective_app_name()?,
            _ => self.app_name.as_deref().unwrap_or_default(),
        };
        let path = file::resolve_store_file(store_path, &file_name, app_name)?;
        Ok(Arc::new(TomlFileStore::new(path)))
    }

    /// Resolve the store and register every declared interface.
    pub fn build(self) -> Result<ConfigManager, StorefigError> {
        let store = self.effective_store()?;

        let mut registry = SchemaRegistry::with_codecs(self.strict, self.codecs);
        for decl in self.interfaces {
            registry.register(decl)?;
        }
        let registry = Arc::new(RwLock::new(registry));

        let accessor = self
            .listeners
            .into_iter()
            .fold(ConfigAccessor::new(store, Arc::clone(&registry)), |a, l| {
                a.with_listener(l)
            });

        Ok(ConfigManager { accessor, registry })
    }
}

/// Owns the schema registry and the accessor bound to one store.
pub struct ConfigManager {
    accessor: ConfigAccessor,
    registry: Arc<RwLock<SchemaRegistry>>,
}

impl ConfigManager {
    pub fn builder() -> ConfigManagerBuilder {
        ConfigManagerBuilder::new()
    }

    pub fn accessor(&self) -> &ConfigAccessor {
        &self.accessor
    }

    fn with_registry<T>(&self, f: impl FnOnce(&mut SchemaRegistry) -> T) -> T {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut registry)
    }

    pub fn register<I: ConfigInterface>(&self) -> Result<Arc<Interface>, StorefigError> {
        self.register_decl(I::interface())
    }

    pub fn register_decl(&self, decl: InterfaceDecl) -> Result<Arc<Interface>, StorefigError> {
        Ok(self.with_registry(|r| r.register(decl))?)
    }

    /// Register an interface derived from a `confique` config struct.
    pub fn register_config<C: Config + Serialize>(
        &self,
        id: &str,
        group: &str,
    ) -> Result<Arc<Interface>, StorefigError> {
        self.register_decl(from_config::<C>(id, group)?)
    }

    /// Remove an interface. Stored values are left in place.
    pub fn unregister(&self, id: &str) -> Option<Arc<Interface>> {
        self.with_registry(|r| r.unregister(id))
    }

    /// Typed access to interface `I`.
    pub fn config<I: ConfigInterface>(&self) -> ConfigProxy<'_> {
        self.accessor.proxy_for::<I>()
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(&self, action: &ConfigAction) -> Result<(), StorefigError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle a `ConfigAction` (list / get / set / unset / gen).
    pub fn handle(&self, action: &ConfigAction) -> Result<ConfigResult, StorefigError> {
        match action {
            ConfigAction::List { group } => ops::list_values(&self.accessor, group.as_deref()),
            ConfigAction::Get { group, key } => ops::get_value(&self.accessor, group, key),
            ConfigAction::Set { group, key, value } => {
                ops::set_value(&self.accessor, group, key, value)
            }
            ConfigAction::Unset { group, key } => ops::unset_value(&self.accessor, group, key),
            ConfigAction::Gen { output } => {
                let template = ops::generate_template(&self.accessor.registry());
                match output {
                    Some(path) => {
                        if let Some(parent) = path.parent() {
                            std::fs::create_dir_all(parent).map_err(|e| {
                                StorefigError::IoError {
                                    path: parent.to_path_buf(),
                                    source: e,
                                }
                            })?;
                        }
                        std::fs::write(path, &template).map_err(|e| StorefigError::IoError {
                            path: path.clone(),
                            source: e,
                        })?;
                        Ok(ConfigResult::TemplateWritten { path: path.clone() })
                    }
                    None => Ok(ConfigResult::Template(template)),
                }
            }
        }
    }
}
