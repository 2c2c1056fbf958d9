use gemx_runtime::Executor;
use std::process::ExitCode;

pub async fn execute(executor: &Executor) -> ExitCode {
    super::report(&executor.list_models().await)
}
