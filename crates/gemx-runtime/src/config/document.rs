use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed contents of `config.json`.
///
/// Keys the tool understands (`model`, `temperature`, `system`, `plugins`,
/// `profiles`, `templates`) are read through accessors; everything else is
/// carried along untouched so a rewrite never drops user data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Map<String, Value>);

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Look up a dot-separated key path, e.g. `plugins.web_fetch`.
    pub fn get_path(&self, key_path: &str) -> Option<&Value> {
        let segments = split_key_path(key_path).ok()?;
        let (first, rest) = segments.split_first()?;
        let mut current = self.0.get(*first)?;
        for segment in rest {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current)
    }

    /// Assign `value` at a dot-separated key path.
    ///
    /// Missing intermediate levels are created. An intermediate level that
    /// exists but is not an object is replaced by an empty object.
    pub fn set_path(&mut self, key_path: &str, value: Value) -> Result<()> {
        let segments = split_key_path(key_path)?;
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => bail!("Empty config key path"),
        };

        let mut current = &mut self.0;
        for segment in parents {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => unreachable!("slot was just made an object"),
            };
        }
        current.insert(last.to_string(), value);
        Ok(())
    }

    /// The `profiles.<name>` override object, if present and an object.
    pub fn profile(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0
            .get("profiles")
            .and_then(Value::as_object)
            .and_then(|profiles| profiles.get(name))
            .and_then(Value::as_object)
    }

    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .0
            .get("profiles")
            .and_then(Value::as_object)
            .map(|profiles| profiles.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Prompt body stored under `templates.<key>`.
    pub fn template(&self, key: &str) -> Option<&str> {
        self.0
            .get("templates")
            .and_then(Value::as_object)
            .and_then(|templates| templates.get(key))
            .and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for ConfigDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn split_key_path(key_path: &str) -> Result<Vec<&str>> {
    if key_path.is_empty() {
        bail!("Empty config key path");
    }
    let segments: Vec<&str> = key_path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        bail!("Invalid config key path '{}': empty segment", key_path);
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ConfigDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn set_path_creates_intermediate_levels() {
        let mut d = ConfigDocument::new();
        d.set_path("a.b.c", json!(3)).unwrap();
        assert_eq!(d.into_value(), json!({"a": {"b": {"c": 3}}}));
    }

    #[test]
    fn set_path_replaces_scalar_intermediate() {
        let mut d = doc(json!({"plugins": "off", "model": "x"}));
        d.set_path("plugins.web_fetch", json!(true)).unwrap();
        assert_eq!(d.into_value(), json!({"plugins": {"web_fetch": true}, "model": "x"}));
    }

    #[test]
    fn set_path_rejects_empty_segments() {
        let mut d = ConfigDocument::new();
        assert!(d.set_path("", json!(1)).is_err());
        assert!(d.set_path("a..b", json!(1)).is_err());
        assert!(d.set_path(".a", json!(1)).is_err());
        assert!(d.is_empty());
    }

    #[test]
    fn get_path_walks_objects_only() {
        let d = doc(json!({"a": {"b": 1}, "s": "text"}));
        assert_eq!(d.get_path("a.b"), Some(&json!(1)));
        assert_eq!(d.get_path("s.x"), None);
        assert_eq!(d.get_path("missing"), None);
    }

    #[test]
    fn profile_must_be_object() {
        let d = doc(json!({"profiles": {"fast": {"temperature": 0.0}, "bad": 3}}));
        assert!(d.profile("fast").is_some());
        assert!(d.profile("bad").is_none());
        assert_eq!(d.profile_names(), vec!["bad", "fast"]);
    }
}
