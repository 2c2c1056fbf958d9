use anyhow::{bail, Result};
use gemx_runtime::{ConfigDocument, ConfigStore};
use std::process::ExitCode;

const DEFAULT_CONFIG: &str = r#"{
  "model": "gemini-2.5-pro",
  "temperature": 0.2,
  "system": "",
  "plugins": {
    "web_fetch": false
  },
  "profiles": {
    "fast": { "model": "gemini-2.5-flash", "temperature": 0.0 },
    "creative": { "temperature": 0.9 }
  },
  "templates": {
    "commit": "Write a concise conventional commit message for the staged changes."
  }
}"#;

/// Write a starter config.json
pub fn run_init(store: &ConfigStore, force: bool) -> Result<ExitCode> {
    if store.path().exists() && !force {
        bail!("Config already exists at {:?} (use --force to overwrite)", store.path());
    }
    let doc: ConfigDocument = serde_json::from_str(DEFAULT_CONFIG)?;
    store.write(&doc)?;
    println!("Created config at {:?}", store.path());
    Ok(ExitCode::SUCCESS)
}
