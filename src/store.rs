//! The string key/value store boundary.
//!
//! The accessor talks to persistence only through [`ConfigStore`]. Values are
//! opaque strings addressed by (group, key); absence means "use the default".

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::StoreError;

/// Persistence for configuration entries.
///
/// Mutating calls return the entry's previous value so change events can
/// carry it without an extra read. Implementations decide their own ordering
/// and durability guarantees; the accessor adds none.
pub trait ConfigStore: Send + Sync {
    fn get_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError>;

    fn set_configuration(
        &self,
        group: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<String>, StoreError>;

    fn unset_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for Arc<S> {
    fn get_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_configuration(group, key)
    }

    fn set_configuration(
        &self,
        group: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<String>, StoreError> {
        (**self).set_configuration(group, key, value)
    }

    fn unset_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        (**self).unset_configuration(group, key)
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: RwLock<BTreeMap<String, BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries as `(group, key, value)`, sorted.
    pub fn entries(&self) -> Result<Vec<(String, String, String)>, StoreError> {
        let groups = self.groups.read().map_err(|_| StoreError::Poisoned)?;
        Ok(groups
            .iter()
            .flat_map(|(group, items)| {
                items
                    .iter()
                    .map(move |(key, value)| (group.clone(), key.clone(), value.clone()))
            })
            .collect())
    }

    /// Every write replaces a whole entry, so a poisoned map is still
    /// readable.
    pub fn is_empty(&self) -> bool {
        self.groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl ConfigStore for MemoryStore {
    fn get_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        let groups = self.groups.read().map_err(|_| StoreError::Poisoned)?;
        Ok(groups.get(group).and_then(|items| items.get(key)).cloned())
    }

    fn set_configuration(
        &self,
        group: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<String>, StoreError> {
        let mut groups = self.groups.write().map_err(|_| StoreError::Poisoned)?;
        Ok(groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string()))
    }

    fn unset_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        let mut groups = self.groups.write().map_err(|_| StoreError::Poisoned)?;
        let Some(items) = groups.get_mut(group) else {
            return Ok(None);
        };
        let old = items.remove(key);
        if items.is_empty() {
            groups.remove(group);
        }
        Ok(old)
    }
}
