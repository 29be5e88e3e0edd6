use std::path::PathBuf;

/// Directory holding the configuration file.
#[derive(Debug, Clone, PartialEq)]
pub enum StorePath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit absolute path.
    Path(PathBuf),
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Every registered item, optionally restricted to one group.
    List { group: Option<String> },
    Get { group: String, key: String },
    Set {
        group: String,
        key: String,
        value: String,
    },
    Unset { group: String, key: String },
    Gen { output: Option<PathBuf> },
}
