use anyhow::{bail, Context, Result};
use gemx_adapters::{GenerationPipe, PipeMode};
use gemx_runtime::{ConfigStore, Executor, SessionState};
use std::io::Read;
use std::process::ExitCode;
use tracing::info;

/// Arguments of `gemx generate`.
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub profile: Option<String>,
    pub pipe_to: Vec<String>,
    pub shell: bool,
}

pub async fn execute(
    request: GenerateRequest,
    store: &ConfigStore,
    executor: &Executor,
) -> Result<ExitCode> {
    let prompt = match request.prompt {
        Some(prompt) => prompt,
        None => read_stdin()?,
    };
    if prompt.trim().is_empty() {
        bail!("Empty prompt: pass it as an argument or on stdin");
    }

    let mut state = SessionState::from_store(store);
    if let Some(profile) = &request.profile {
        if !state.apply_profile(store, profile) {
            eprintln!("Profile '{}' not found in {:?}", profile, store.path());
            return Ok(ExitCode::FAILURE);
        }
    }
    let state = state.with_overrides(request.model, request.temperature);

    Ok(run_prompt(&prompt, &state, executor, &request.pipe_to, request.shell).await)
}

/// Generate from `prompt`, optionally piping the text into another command.
pub async fn run_prompt(
    prompt: &str,
    state: &SessionState,
    executor: &Executor,
    pipe_to: &[String],
    shell: bool,
) -> ExitCode {
    let result = if pipe_to.is_empty() {
        executor.generate(prompt, state).await
    } else {
        let mode = if shell { PipeMode::Shell } else { PipeMode::Direct };
        GenerationPipe::new(executor, mode)
            .run(prompt, state, pipe_to)
            .await
    };

    info!(exit_code = result.exit_code(), "Generation finished");
    super::report(&result)
}

fn read_stdin() -> Result<String> {
    let mut prompt = String::new();
    std::io::stdin()
        .read_to_string(&mut prompt)
        .context("Failed to read prompt from stdin")?;
    Ok(prompt)
}
