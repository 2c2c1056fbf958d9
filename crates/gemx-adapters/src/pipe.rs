use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use gemx_runtime::executor::collect_output;
use gemx_runtime::{ExecutionResult, Executor, SessionState};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How generated text reaches the downstream program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipeMode {
    /// Generator stdout wired straight into the downstream stdin. No shell.
    #[default]
    Direct,
    /// One `sh -c` line with every argument quoted individually. The shell
    /// leads its own process group so a timeout reaches every stage.
    Shell,
}

/// Pipes generated text into a second program, e.g. `pbcopy` or an
/// automation runner.
pub struct GenerationPipe<'a> {
    executor: &'a Executor,
    mode: PipeMode,
}

impl<'a> GenerationPipe<'a> {
    pub fn new(executor: &'a Executor, mode: PipeMode) -> Self {
        Self { executor, mode }
    }

    /// Run `generate` and feed its stdout to `downstream` (program + args).
    ///
    /// The result carries the downstream program's output. A failing
    /// generator stage takes precedence over the downstream exit code.
    pub async fn run(
        &self,
        prompt: &str,
        state: &SessionState,
        downstream: &[String],
    ) -> ExecutionResult {
        if downstream.is_empty() {
            return ExecutionResult::SpawnFailed {
                message: "No downstream command given".to_string(),
            };
        }
        let Some((binary, args)) = self.executor.generation_command(state) else {
            return ExecutionResult::BinaryNotFound {
                searched: self.executor.searched_names().to_vec(),
            };
        };

        info!(
            binary = ?binary,
            downstream = %downstream[0],
            mode = ?self.mode,
            "Generating into pipe"
        );
        match self.mode {
            PipeMode::Direct => {
                run_direct(&binary, &args, downstream, prompt, self.executor.timeout()).await
            }
            PipeMode::Shell => match shell_line(&binary, &args, downstream) {
                Ok(line) => {
                    debug!(line = %line, "Composed shell pipeline");
                    self.executor
                        .run_command_grouped("sh", &["-c".to_string(), line], Some(prompt))
                        .await
                }
                Err(e) => ExecutionResult::SpawnFailed {
                    message: format!("{:#}", e),
                },
            },
        }
    }
}

/// `'bin' 'arg' ... | 'prog' 'arg' ...`, each word quoted on its own.
///
/// Fails on words the shell cannot represent (NUL bytes) rather than
/// passing them through unquoted.
pub fn shell_line(binary: &Path, args: &[String], downstream: &[String]) -> Result<String> {
    let binary = match binary.to_str() {
        Some(binary) => binary,
        None => bail!("Binary path is not valid UTF-8: {:?}", binary),
    };

    let generator = std::iter::once(binary).chain(args.iter().map(String::as_str));
    let generator = shlex::try_join(generator).context("Cannot quote generation command")?;
    let consumer = shlex::try_join(downstream.iter().map(String::as_str))
        .context("Cannot quote downstream command")?;

    Ok(format!("{} | {}", generator, consumer))
}

async fn run_direct(
    binary: &Path,
    args: &[String],
    downstream: &[String],
    prompt: &str,
    timeout: Duration,
) -> ExecutionResult {
    let mut generator = match Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return spawn_failed(binary.as_os_str(), e),
    };

    let handoff = match generator.stdout.take() {
        Some(stdout) => TryInto::<Stdio>::try_into(stdout),
        None => Err(io::Error::new(
            io::ErrorKind::Other,
            "generator stdout not captured",
        )),
    };
    let handoff = match handoff {
        Ok(stdio) => stdio,
        Err(e) => {
            return ExecutionResult::SpawnFailed {
                message: format!("Cannot hand generator stdout to pipe: {}", e),
            }
        }
    };

    let Some((program, rest)) = downstream.split_first() else {
        return ExecutionResult::SpawnFailed {
            message: "No downstream command given".to_string(),
        };
    };
    let consumer = match Command::new(program)
        .args(rest)
        .stdin(handoff)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return spawn_failed(OsStr::new(program), e),
    };

    if let Some(mut stdin) = generator.stdin.take() {
        let prompt = prompt.to_owned();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                debug!(error = %e, "Generator closed stdin early");
            }
        });
    }

    let (generated, consumed) = tokio::join!(
        collect_output(generator, None, timeout),
        collect_output(consumer, None, timeout)
    );

    match generated {
        ExecutionResult::TimedOut { .. } => generated,
        ExecutionResult::Completed {
            exit_code, stderr, ..
        } if exit_code != 0 && matches!(consumed, ExecutionResult::Completed { .. }) => {
            warn!(exit_code, "Generator failed inside pipe");
            ExecutionResult::Completed {
                exit_code,
                stdout: consumed.stdout().to_string(),
                stderr: format!("{}{}", stderr, consumed.stderr()),
            }
        }
        _ => consumed,
    }
}

fn spawn_failed(program: &OsStr, e: io::Error) -> ExecutionResult {
    warn!(program = ?program, error = %e, "Failed to spawn pipe stage");
    ExecutionResult::SpawnFailed {
        message: format!("Failed to spawn {:?}: {}", program, e),
    }
}
