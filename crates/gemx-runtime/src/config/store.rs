use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::ConfigDocument;

/// Conventional location of the config file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/gemx/config.json";

/// JSON config file with a per-instance cache.
///
/// The first successful `read` is cached until `invalidate` or `set`.
/// Separate stores never share a cache. Writes overwrite the file in place:
/// a crash mid-write can leave a truncated file, which later reads treat as
/// an empty document.
pub struct ConfigStore {
    path: PathBuf,
    cache: Mutex<Option<ConfigDocument>>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Store at `~/.config/gemx/config.json`.
    pub fn at_default_path() -> Self {
        Self::new(default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document. Never fails: a missing or unparsable file reads as `{}`.
    pub fn read(&self) -> ConfigDocument {
        let mut cache = self.lock_cache();
        if let Some(doc) = cache.as_ref() {
            return doc.clone();
        }

        match load_document(&self.path) {
            Some(doc) => {
                *cache = Some(doc.clone());
                doc
            }
            None => ConfigDocument::new(),
        }
    }

    /// Serialize `doc` as indented JSON and overwrite the config file.
    pub fn write(&self, doc: &ConfigDocument) -> Result<()> {
        let content = serde_json::to_string_pretty(doc).context("Failed to serialize config")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {:?}", parent))?;
        }
        std::fs::write(&self.path, content + "\n")
            .context(format!("Failed to write config file: {:?}", self.path))?;

        debug!(path = ?self.path, "Config written");
        Ok(())
    }

    /// Value at a dot-separated key path.
    pub fn get(&self, key_path: &str) -> Option<Value> {
        self.read().get_path(key_path).cloned()
    }

    /// Assign `value` at a dot-separated key path and persist the document.
    ///
    /// The key path is validated before the file is touched, so a rejected
    /// path leaves the previous file intact.
    pub fn set(&self, key_path: &str, value: Value) -> Result<()> {
        let mut doc = self.read();
        doc.set_path(key_path, value)?;
        self.write(&doc)?;
        info!(key = key_path, path = ?self.path, "Config value updated");
        self.reload();
        Ok(())
    }

    /// Drop the cached document; the next `read` goes to disk.
    pub fn invalidate(&self) {
        *self.lock_cache() = None;
    }

    /// Invalidate and immediately re-read from disk.
    pub fn reload(&self) -> ConfigDocument {
        self.invalidate();
        self.read()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, Option<ConfigDocument>> {
        // A poisoned cache only means another reader panicked; the data is a plain clone.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Expand `~` in the conventional config location.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).to_string())
}

/// Read and parse the file. `None` means "do not cache": missing or invalid.
fn load_document(path: &Path) -> Option<ConfigDocument> {
    if !path.is_file() {
        debug!(path = ?path, "No config file, using empty config");
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = ?path, error = %e, "Failed to read config file, using empty config");
            return None;
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Some(ConfigDocument::from(map)),
        Ok(_) => {
            warn!(path = ?path, "Config file is not a JSON object, using empty config");
            None
        }
        Err(e) => {
            warn!(path = ?path, error = %e, "Invalid JSON in config file, using empty config");
            None
        }
    }
}
