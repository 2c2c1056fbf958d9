pub mod command;
pub mod config;
pub mod executor;
pub mod session;

pub use command::{build_args, format_temperature};
pub use config::{ConfigDocument, ConfigStore};
pub use executor::{DependencyReport, ExecutionResult, Executor, GENERATION_BINARIES};
pub use session::SessionState;

/// Initialize structured JSON logging on stderr.
///
/// `RUST_LOG` wins when set; otherwise warnings and up, or errors only when `quiet`.
pub fn init_logging(quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if quiet { "error" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
