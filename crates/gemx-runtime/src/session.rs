use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ConfigStore;

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Per-invocation generation settings.
///
/// Seeded from the config file by [`SessionState::load_and_init`] at the
/// start of each command, then narrowed by profiles and CLI overrides.
/// Never written back; only the config document is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub model: String,
    pub temperature: f64,
    pub system: String,
    pub plugins: BTreeMap<String, bool>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            system: String::new(),
            plugins: BTreeMap::new(),
        }
    }
}

impl SessionState {
    /// Defaults overlaid with the store's top-level keys.
    pub fn from_store(store: &ConfigStore) -> Self {
        let mut state = Self::default();
        state.load_and_init(store);
        state
    }

    /// Overwrite each field from the config document when its key is
    /// present; fields whose key is absent keep their current value.
    pub fn load_and_init(&mut self, store: &ConfigStore) {
        let doc = store.read();
        self.overlay(doc.as_map(), "config");
    }

    /// Overlay `profiles.<name>` onto this session.
    ///
    /// Returns `false`, leaving the session untouched, when the profile
    /// does not exist.
    pub fn apply_profile(&mut self, store: &ConfigStore, name: &str) -> bool {
        let doc = store.read();
        match doc.profile(name) {
            Some(profile) => {
                self.overlay(profile, name);
                debug!(profile = name, model = %self.model, temperature = self.temperature, "Profile applied");
                true
            }
            None => false,
        }
    }

    /// Per-invocation overrides from the command line.
    pub fn with_overrides(mut self, model: Option<String>, temperature: Option<f64>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(temperature) = temperature {
            self.temperature = temperature;
        }
        self
    }

    /// Whether a plugin toggle is switched on.
    pub fn plugin_enabled(&self, name: &str) -> bool {
        self.plugins.get(name).copied().unwrap_or(false)
    }

    fn overlay(&mut self, source: &Map<String, Value>, origin: &str) {
        if let Some(value) = source.get("model") {
            match value.as_str() {
                Some(model) => self.model = model.to_string(),
                None => warn!(origin, "Ignoring non-string 'model'"),
            }
        }

        if let Some(value) = source.get("temperature") {
            match value.as_f64() {
                Some(temperature) => self.temperature = temperature,
                None => warn!(origin, "Ignoring non-numeric 'temperature'"),
            }
        }

        if let Some(value) = source.get("system") {
            match value.as_str() {
                Some(system) => self.system = system.to_string(),
                None => warn!(origin, "Ignoring non-string 'system'"),
            }
        }

        if let Some(value) = source.get("plugins") {
            match value.as_object() {
                Some(plugins) => {
                    self.plugins = plugins
                        .iter()
                        .filter_map(|(name, enabled)| enabled.as_bool().map(|b| (name.clone(), b)))
                        .collect();
                }
                None => warn!(origin, "Ignoring non-object 'plugins'"),
            }
        }
    }
}
