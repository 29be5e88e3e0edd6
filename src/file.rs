//! Locating and reading the store file.
//!
//! A [`StorePath`] names one directory; the store file is `{dir}/{file_name}`.
//! A missing file reads as empty. Only actual I/O errors (permissions, etc.)
//! are propagated.

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StorefigError};
use crate::types::StorePath;

/// Resolve a [`StorePath`] to a concrete directory.
///
/// `app_name` is used by `StorePath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_store_dir(sp: &StorePath, app_name: &str) -> Option<PathBuf> {
    match sp {
        StorePath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        StorePath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        StorePath::Cwd => std::env::current_dir().ok(),
        StorePath::Path(p) => Some(p.clone()),
    }
}

/// Resolve the full path of the store file.
pub fn resolve_store_file(
    sp: &StorePath,
    file_name: &str,
    app_name: &str,
) -> Result<PathBuf, StorefigError> {
    resolve_store_dir(sp, app_name)
        .map(|dir| dir.join(file_name))
        .ok_or(StorefigError::NoStorePath)
}

/// Read the store file, `None` if it does not exist yet.
pub fn read_store_file(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Write the store file, creating parent directories as needed.
pub fn write_store_file(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
