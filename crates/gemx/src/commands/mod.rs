pub mod action;
pub mod auto;
pub mod config;
pub mod generate;
pub mod init;
pub mod models;
pub mod profile;
pub mod setup;
pub mod template;

use gemx_runtime::ExecutionResult;
use std::process::ExitCode;

/// Map a child or sentinel exit code onto a process exit status.
pub fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_status(code))
}

/// Codes outside `0..=255` (spawn failures) collapse to 1.
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

/// Print an execution result and return the matching exit status.
pub fn report(result: &ExecutionResult) -> ExitCode {
    if !result.stdout().is_empty() {
        println!("{}", result.stdout());
    }
    if !result.stderr().is_empty() {
        eprint!("{}", result.stderr());
        if !result.stderr().ends_with('\n') {
            eprintln!();
        }
    }
    if let ExecutionResult::BinaryNotFound { .. } | ExecutionResult::TimedOut { .. } = result {
        if let Some(message) = result.failure_message() {
            eprintln!("Error: {}", message);
        }
    }
    exit_code(result.exit_code())
}
