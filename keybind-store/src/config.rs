use std::path::{Path, PathBuf};

/// Default database file name inside the data directory.
pub const DEFAULT_DB_FILE: &str = "credentials.db";

/// Default keystore alias of the master key.
pub const DEFAULT_KEY_ALIAS: &str = "keybind_master_key";

/// Where the store keeps its data and which master key it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub key_alias: String,
}

impl StoreConfig {
    /// Default file name and alias under `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            db_path: data_dir.join(DEFAULT_DB_FILE),
            key_alias: DEFAULT_KEY_ALIAS.to_string(),
        }
    }

    #[must_use]
    pub fn with_key_alias(mut self, alias: impl Into<String>) -> Self {
        self.key_alias = alias.into();
        self
    }
}
