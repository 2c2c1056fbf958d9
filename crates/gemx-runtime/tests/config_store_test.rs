use gemx_runtime::{ConfigDocument, ConfigStore};
use serde_json::json;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> ConfigStore {
    ConfigStore::new(dir.path().join("gemx").join("config.json"))
}

#[test]
fn test_missing_file_reads_empty() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(store.read().is_empty());
    assert!(!store.path().exists());
}

#[test]
fn test_invalid_json_reads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = ConfigStore::new(&path);
    assert!(store.read().is_empty());
}

#[test]
fn test_non_object_json_reads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(ConfigStore::new(&path).read().is_empty());
}

#[test]
fn test_write_then_read_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let doc: ConfigDocument = serde_json::from_value(json!({
        "model": "gemini-2.5-flash",
        "temperature": 0.7,
        "plugins": {"web_fetch": true},
        "templates": {"commit": "Write a commit message"},
        "custom": [1, {"nested": null}]
    }))
    .unwrap();

    store.write(&doc).unwrap();

    // Fresh store so the read comes from disk, not the cache
    let reread = ConfigStore::new(store.path()).read();
    assert_eq!(reread, doc);
}

#[test]
fn test_read_is_cached_until_invalidated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"model": "first"}"#).unwrap();

    let store = ConfigStore::new(&path);
    assert_eq!(store.get("model"), Some(json!("first")));

    std::fs::write(&path, r#"{"model": "second"}"#).unwrap();
    assert_eq!(store.get("model"), Some(json!("first")));

    store.invalidate();
    assert_eq!(store.get("model"), Some(json!("second")));
}

#[test]
fn test_set_nested_preserves_siblings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"model": "m", "a": {"b": {"keep": 1}, "other": "x"}, "unknown": [true]}"#,
    )
    .unwrap();

    let store = ConfigStore::new(&path);
    store.set("a.b.c", json!({"deep": 2})).unwrap();

    let doc = store.read();
    assert_eq!(doc.get_path("a.b.c"), Some(&json!({"deep": 2})));
    assert_eq!(doc.get_path("a.b.keep"), Some(&json!(1)));
    assert_eq!(doc.get_path("a.other"), Some(&json!("x")));
    assert_eq!(doc.get_path("model"), Some(&json!("m")));
    assert_eq!(doc.get_path("unknown"), Some(&json!([true])));
}

#[test]
fn test_set_creates_file_and_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.set("plugins.web_fetch", json!(true)).unwrap();

    assert!(store.path().is_file());
    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"plugins": {"web_fetch": true}}));
}

#[test]
fn test_set_overwrites_scalar_intermediate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"plugins": "disabled"}"#).unwrap();

    let store = ConfigStore::new(&path);
    store.set("plugins.web_fetch", json!(false)).unwrap();

    assert_eq!(store.get("plugins"), Some(json!({"web_fetch": false})));
}

#[test]
fn test_set_refreshes_stale_cache() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.set("model", json!("a")).unwrap();
    assert_eq!(store.get("model"), Some(json!("a")));

    store.set("model", json!("b")).unwrap();
    assert_eq!(store.get("model"), Some(json!("b")));
}

#[test]
fn test_invalid_key_path_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let original = r#"{"model": "keep"}"#;
    std::fs::write(&path, original).unwrap();

    let store = ConfigStore::new(&path);
    assert!(store.set("a..b", json!(1)).is_err());
    assert!(store.set("", json!(1)).is_err());

    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_independent_stores_do_not_share_cache() {
    let dir = TempDir::new().unwrap();
    let first = ConfigStore::new(dir.path().join("one.json"));
    let second = ConfigStore::new(dir.path().join("two.json"));

    first.set("model", json!("one")).unwrap();

    assert_eq!(first.get("model"), Some(json!("one")));
    assert_eq!(second.get("model"), None);
}
