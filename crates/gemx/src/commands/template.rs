use anyhow::Result;
use gemx_runtime::{ConfigStore, Executor, SessionState};
use std::process::ExitCode;

/// Run the prompt stored under `templates.<key>`.
pub async fn execute(key: &str, store: &ConfigStore, executor: &Executor) -> Result<ExitCode> {
    let state = SessionState::from_store(store);
    let Some(prompt) = store.read().template(key).map(str::to_owned) else {
        eprintln!("Template '{}' not found in {:?}", key, store.path());
        return Ok(ExitCode::FAILURE);
    };

    Ok(super::generate::run_prompt(&prompt, &state, executor, &[], false).await)
}
