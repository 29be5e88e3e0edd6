//! TOML file store: one table per group, one string per key.
//!
//! Uses `toml_edit` for comment-preserving edits, so a hand-edited file keeps
//! its comments and layout across writes. Values are written as TOML strings;
//! hand-written non-string scalars (`maxItems = 7`) read back as their TOML
//! text. Empty group tables are dropped on unset.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use toml_edit::{DocumentMut, Item, Table};

use crate::error::StoreError;
use crate::file::{read_store_file, write_store_file};
use crate::store::ConfigStore;

/// Parse the store file's content. `None` (no file yet) is an empty document.
pub fn parse_document(path: &Path, content: Option<&str>) -> Result<DocumentMut, StoreError> {
    content
        .unwrap_or_default()
        .parse()
        .map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Pure function: read `group.key` from a document.
pub fn get_in_document(
    doc: &DocumentMut,
    path: &Path,
    group: &str,
    key: &str,
) -> Result<Option<String>, StoreError> {
    let Some(table) = doc.get(group) else {
        return Ok(None);
    };
    let table = table.as_table_like().ok_or_else(|| StoreError::NotATable {
        path: path.to_path_buf(),
        group: group.into(),
    })?;
    Ok(table.get(key).map(render))
}

/// Pure function: set `group.key` to a string, creating the group table if
/// needed. Returns the previous value.
pub fn set_in_document(
    doc: &mut DocumentMut,
    path: &Path,
    group: &str,
    key: &str,
    value: &str,
) -> Result<Option<String>, StoreError> {
    let table = doc
        .entry(group)
        .or_insert_with(|| Item::Table(Table::new()))
        .as_table_like_mut()
        .ok_or_else(|| StoreError::NotATable {
            path: path.to_path_buf(),
            group: group.into(),
        })?;

    let previous = table.get(key).map(render);
    match table.get_mut(key).and_then(Item::as_value_mut) {
        // Keep the entry's decor (trailing comments, spacing).
        Some(existing) => {
            let decor = existing.decor().clone();
            *existing = value.into();
            *existing.decor_mut() = decor;
        }
        None => {
            table.insert(key, toml_edit::value(value));
        }
    }
    Ok(previous)
}

/// Pure function: remove `group.key`, dropping the group table if it ends up
/// empty. Returns the removed value.
pub fn unset_in_document(
    doc: &mut DocumentMut,
    path: &Path,
    group: &str,
    key: &str,
) -> Result<Option<String>, StoreError> {
    let Some(item) = doc.get_mut(group) else {
        return Ok(None);
    };
    let table = item.as_table_like_mut().ok_or_else(|| StoreError::NotATable {
        path: path.to_path_buf(),
        group: group.into(),
    })?;
    let Some(removed) = table.remove(key) else {
        return Ok(None);
    };
    if table.is_empty() {
        doc.remove(group);
    }
    Ok(Some(render(&removed)))
}

/// The stored string for an entry, without surrounding decor. Strings are
/// unquoted; anything else (numbers, arrays, tables) is its TOML text.
fn render(item: &Item) -> String {
    match item.as_value() {
        Some(value) => match value.as_str() {
            Some(s) => s.to_string(),
            None => {
                let mut bare = value.clone();
                bare.decor_mut().clear();
                bare.to_string()
            }
        },
        None => item.to_string().trim().to_string(),
    }
}

/// A [`ConfigStore`] backed by a TOML file.
///
/// Each operation rereads the file, so edits made while the process runs are
/// picked up. The mutex serializes read-modify-write cycles within this
/// process; concurrent writers in other processes are not coordinated.
#[derive(Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Option<DocumentMut>, StoreError> {
        read_store_file(&self.path)?
            .map(|content| parse_document(&self.path, Some(&content)))
            .transpose()
    }
}

impl ConfigStore for TomlFileStore {
    fn get_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        match self.load()? {
            Some(doc) => get_in_document(&doc, &self.path, group, key),
            None => Ok(None),
        }
    }

    fn set_configuration(
        &self,
        group: &str,
        key: &str,
        value: &str,
    ) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut doc = self.load()?.unwrap_or_default();
        let previous = set_in_document(&mut doc, &self.path, group, key, value)?;
        write_store_file(&self.path, &doc.to_string())?;
        Ok(previous)
    }

    fn unset_configuration(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let Some(mut doc) = self.load()? else {
            return Ok(None);
        };
        let removed = unset_in_document(&mut doc, &self.path, group, key)?;
        if removed.is_some() {
            write_store_file(&self.path, &doc.to_string())?;
        }
        Ok(removed)
    }
}
