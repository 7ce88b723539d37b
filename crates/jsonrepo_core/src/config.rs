//! Store configuration.
//!
//! # Responsibility
//! - Locate the directory holding collection files.
//! - Select compact or pretty JSON output.
//!
//! # Invariants
//! - Collection files live directly under `data_dir`.

use std::path::PathBuf;

/// Default directory for collection files, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "./data";
/// Overrides `data_dir` in [`StoreConfig::from_env`].
pub const DATA_DIR_ENV: &str = "JSONREPO_DATA_DIR";
/// Enables pretty output in [`StoreConfig::from_env`] when `1` or `true`.
pub const PRETTY_ENV: &str = "JSONREPO_PRETTY";

/// Settings shared by every collection store of a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    /// Indent written files. Reads accept either form.
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            pretty: false,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Builds a config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var(DATA_DIR_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let pretty = std::env::var(PRETTY_ENV)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        Self::new(data_dir).with_pretty(pretty)
    }

    /// Backing file path for a collection.
    pub fn collection_path(&self, collection_name: &str) -> PathBuf {
        self.data_dir.join(format!("{collection_name}.json"))
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
