use std::path::PathBuf;

use thiserror::Error;

/// Registration and lookup failures in the schema registry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Configuration interface '{interface}' has no group")]
    MissingGroup { interface: String },

    #[error("Configuration method '{interface}.{method}' has no item")]
    MissingItem { interface: String, method: String },

    #[error("Configuration interface '{0}' is already registered")]
    DuplicateInterface(String),

    #[error("Key '{group}.{key}' is already declared by '{interface}.{method}'")]
    DuplicateKey {
        group: String,
        key: String,
        interface: String,
        method: String,
    },

    #[error("Item '{group}.{key}' uses unknown value type '{type_name}'")]
    UnknownType {
        group: String,
        key: String,
        type_name: String,
    },

    #[error("Item '{group}.{key}' declares an enumeration with no variants")]
    EmptyEnum { group: String, key: String },

    #[error("Configuration method '{interface}.{method}' is declared twice")]
    DuplicateMethod { interface: String, method: String },

    #[error("Unknown configuration interface '{0}'")]
    UnknownInterface(String),

    #[error("Unknown configuration method '{interface}.{method}'")]
    UnknownMethod { interface: String, method: String },
}

/// Failures raised by a [`ConfigStore`](crate::ConfigStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml_edit::TomlError,
    },

    #[error("Entry '{group}' in {path} is not a table")]
    NotATable { path: PathBuf, group: String },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Store rejected the operation: {0}")]
    Rejected(String),
}

/// Fatal accessor failures. Recoverable conditions never surface here.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Invalid arguments to '{group}.{key}': {reason}")]
    Argument {
        group: String,
        key: String,
        reason: String,
    },

    #[error("Default for '{group}.{key}' could not be computed: {reason}")]
    DefaultInvocation {
        group: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StorefigError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to write {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No store configured; call .store() or .store_path() on the builder")]
    NoStore,

    #[error("Could not resolve the store directory (no home or config directory found)")]
    NoStorePath,

    #[error("App name is required; call .app_name() on the builder")]
    AppNameRequired,
}
