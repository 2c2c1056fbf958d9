use anyhow::Result;
use gemx_runtime::{ConfigStore, SessionState};
use std::process::ExitCode;

/// Apply a profile and print the session it produces.
pub fn apply(name: &str, store: &ConfigStore) -> Result<ExitCode> {
    let mut state = SessionState::from_store(store);
    if !state.apply_profile(store, name) {
        eprintln!("Profile '{}' not found", name);
        let available = store.read().profile_names();
        if !available.is_empty() {
            eprintln!("Available profiles: {}", available.join(", "));
        }
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(ExitCode::SUCCESS)
}

pub fn list(store: &ConfigStore) -> ExitCode {
    for name in store.read().profile_names() {
        println!("{}", name);
    }
    ExitCode::SUCCESS
}
