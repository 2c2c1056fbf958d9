use std::ffi::{OsStr, OsString};
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::build_args;
use crate::session::SessionState;

/// Generation binaries in lookup order; the first one found wins.
pub const GENERATION_BINARIES: &[&str] = &["gemini", "gmini"];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of one external invocation.
///
/// Missing binaries, timeouts and spawn failures are values here, not
/// errors: callers decide how to report them.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// The process ran to completion. `stdout` has trailing whitespace trimmed.
    Completed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// None of the searched names resolved; nothing was spawned.
    BinaryNotFound { searched: Vec<String> },
    /// The process outlived its deadline and was killed.
    TimedOut { after: Duration },
    /// The OS refused to start (or wait on) the process.
    SpawnFailed { message: String },
}

impl ExecutionResult {
    pub const EXIT_BINARY_NOT_FOUND: i32 = 127;
    pub const EXIT_TIMED_OUT: i32 = 124;
    pub const EXIT_SPAWN_FAILED: i32 = -1;

    /// Real exit code, or the sentinel for a non-completed outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { exit_code, .. } => *exit_code,
            Self::BinaryNotFound { .. } => Self::EXIT_BINARY_NOT_FOUND,
            Self::TimedOut { .. } => Self::EXIT_TIMED_OUT,
            Self::SpawnFailed { .. } => Self::EXIT_SPAWN_FAILED,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { exit_code: 0, .. })
    }

    pub fn stdout(&self) -> &str {
        match self {
            Self::Completed { stdout, .. } => stdout,
            _ => "",
        }
    }

    /// Captured stderr, or the OS error text for a spawn failure.
    pub fn stderr(&self) -> &str {
        match self {
            Self::Completed { stderr, .. } => stderr,
            Self::SpawnFailed { message } => message,
            _ => "",
        }
    }

    /// Human-readable reason for a non-completed outcome.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Completed { .. } => None,
            Self::BinaryNotFound { searched } => Some(format!(
                "No generation binary found on PATH (searched: {})",
                searched.join(", ")
            )),
            Self::TimedOut { after } => {
                Some(format!("Generation timed out after {}s", after.as_secs_f64()))
            }
            Self::SpawnFailed { message } => Some(message.clone()),
        }
    }
}

/// Which external tools resolve on the search path.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyReport {
    pub generation_binary: Option<PathBuf>,
    pub jq: Option<PathBuf>,
}

impl DependencyReport {
    /// Generation is possible; `jq` is only needed by shell automations.
    pub fn is_ready(&self) -> bool {
        self.generation_binary.is_some()
    }
}

/// Locates and runs the external generation binary.
pub struct Executor {
    binaries: Vec<String>,
    search_path: Option<OsString>,
    timeout: Duration,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Executor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            binaries: GENERATION_BINARIES.iter().map(|b| b.to_string()).collect(),
            search_path: None,
            timeout,
        }
    }

    /// Search these directories instead of `PATH`.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn searched_names(&self) -> &[String] {
        &self.binaries
    }

    /// First generation binary that resolves, in priority order.
    pub fn locate_binary(&self) -> Option<PathBuf> {
        self.binaries.iter().find_map(|name| self.resolve(name))
    }

    /// Resolve any program name against the executor's search path.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_default();
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };
        found.ok()
    }

    /// Binary path plus generation arguments for `state`.
    pub fn generation_command(&self, state: &SessionState) -> Option<(PathBuf, Vec<String>)> {
        self.locate_binary().map(|binary| (binary, build_args(state)))
    }

    /// Run one generation with `prompt` on stdin.
    pub async fn generate(&self, prompt: &str, state: &SessionState) -> ExecutionResult {
        let Some((binary, args)) = self.generation_command(state) else {
            warn!(searched = ?self.binaries, "Generation binary not found");
            return self.not_found();
        };

        info!(
            binary = ?binary,
            model = %state.model,
            temperature = state.temperature,
            "Generating"
        );
        self.run_command(&binary, &args, Some(prompt)).await
    }

    /// `<bin> model list`, falling back to `<bin> models` when the first
    /// form exits non-zero.
    pub async fn list_models(&self) -> ExecutionResult {
        let Some(binary) = self.locate_binary() else {
            return self.not_found();
        };

        let result = self
            .run_command(&binary, &["model".to_string(), "list".to_string()], None)
            .await;
        match result {
            ExecutionResult::Completed { exit_code, .. } if exit_code != 0 => {
                debug!(exit_code, "'model list' failed, trying 'models'");
                self.run_command(&binary, &["models".to_string()], None)
                    .await
            }
            other => other,
        }
    }

    pub fn check_dependencies(&self) -> DependencyReport {
        DependencyReport {
            generation_binary: self.locate_binary(),
            jq: self.resolve("jq"),
        }
    }

    /// Spawn `program args`, feed `stdin`, and wait up to the timeout.
    pub async fn run_command(
        &self,
        program: impl AsRef<OsStr>,
        args: &[String],
        stdin: Option<&str>,
    ) -> ExecutionResult {
        self.spawn_and_collect(program.as_ref(), args, stdin, false)
            .await
    }

    /// Like [`run_command`](Self::run_command), but the child leads a new
    /// process group and a timeout kills the whole group. For `sh -c`
    /// lines whose stages would otherwise outlive the shell.
    pub async fn run_command_grouped(
        &self,
        program: impl AsRef<OsStr>,
        args: &[String],
        stdin: Option<&str>,
    ) -> ExecutionResult {
        self.spawn_and_collect(program.as_ref(), args, stdin, true)
            .await
    }

    async fn spawn_and_collect(
        &self,
        program: &OsStr,
        args: &[String],
        stdin: Option<&str>,
        own_group: bool,
    ) -> ExecutionResult {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        if own_group {
            command.process_group(0);
        }
        #[cfg(not(unix))]
        let _ = own_group;

        match command.spawn() {
            Ok(child) => {
                debug!(program = ?program, own_group, "Process spawned");
                collect_output(child, stdin.map(str::to_owned), self.timeout).await
            }
            Err(e) => {
                warn!(program = ?program, error = %e, "Failed to spawn process");
                ExecutionResult::SpawnFailed {
                    message: format!("Failed to spawn {:?}: {}", program, e),
                }
            }
        }
    }

    fn not_found(&self) -> ExecutionResult {
        ExecutionResult::BinaryNotFound {
            searched: self.binaries.clone(),
        }
    }
}

/// Feed `stdin` to a spawned child, drain its output, and enforce `timeout`.
///
/// The deadline covers the exit and both pipe drains: a background process
/// holding the pipes open counts against it too. On timeout the child (and
/// its process group, when it leads one) is killed and no output is returned.
pub async fn collect_output(
    mut child: Child,
    stdin: Option<String>,
    timeout: Duration,
) -> ExecutionResult {
    let mut writer = match (child.stdin.take(), stdin) {
        (Some(mut pipe), Some(input)) => Some(tokio::spawn(async move {
            if let Err(e) = pipe.write_all(input.as_bytes()).await {
                debug!(error = %e, "stdin closed before input was fully written");
            }
        })),
        _ => None,
    };
    let mut stdout = child.stdout.take().map(|pipe| tokio::spawn(read_pipe(pipe)));
    let mut stderr = child.stderr.take().map(|pipe| tokio::spawn(read_pipe(pipe)));
    // Looked up while the child is unreaped; the group outlives its leader.
    let group = led_process_group(&child);

    let finished = tokio::time::timeout(timeout, async {
        let status = child.wait().await?;
        let stdout = join_pipe(stdout.as_mut()).await;
        let stderr = join_pipe(stderr.as_mut()).await;
        if let Some(writer) = writer.as_mut() {
            let _ = writer.await;
        }
        Ok::<_, io::Error>((status, stdout, stderr))
    })
    .await;

    match finished {
        Ok(Ok((status, stdout, stderr))) => {
            let exit_code = exit_code_of(status);
            debug!(exit_code, "Process exited");
            ExecutionResult::Completed {
                exit_code,
                stdout: stdout.trim_end().to_string(),
                stderr,
            }
        }
        Ok(Err(e)) => ExecutionResult::SpawnFailed {
            message: format!("Failed to wait for process: {}", e),
        },
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs_f64(), "Process timed out, killing");
            if let Some(group) = group {
                kill_process_group(group);
            }
            if let Err(e) = child.kill().await {
                debug!(error = %e, "Failed to kill timed-out process");
            }
            for handle in [stdout, stderr].into_iter().flatten() {
                handle.abort();
            }
            if let Some(writer) = writer {
                writer.abort();
            }
            ExecutionResult::TimedOut { after: timeout }
        }
    }
}

/// Exit code, or `128 + signal` for a child killed by a signal.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    128
}

/// The child's process group id, if the child leads its own group.
#[cfg(unix)]
fn led_process_group(child: &Child) -> Option<u32> {
    use nix::unistd::{getpgid, Pid};

    let pid = child.id()?;
    let group = getpgid(Some(Pid::from_raw(pid as i32))).ok()?;
    (group.as_raw() as u32 == pid).then_some(pid)
}

#[cfg(not(unix))]
fn led_process_group(_child: &Child) -> Option<u32> {
    None
}

#[cfg(unix)]
fn kill_process_group(group: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(group as i32), Signal::SIGKILL) {
        debug!(error = %e, "Failed to kill process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_group: u32) {}

async fn read_pipe<R: AsyncRead + Unpin>(mut pipe: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = pipe.read_to_end(&mut buf).await {
        debug!(error = %e, "Failed to drain process pipe");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn join_pipe(handle: Option<&mut JoinHandle<String>>) -> String {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}
