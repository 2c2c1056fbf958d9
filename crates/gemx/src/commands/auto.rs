use anyhow::Result;
use gemx_adapters::AutomationGuard;
use gemx_runtime::Executor;
use std::process::ExitCode;

pub fn list() -> Result<ExitCode> {
    let guard = AutomationGuard::from_env()?;
    for name in guard.list()? {
        println!("{}", name);
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn run(
    name: &str,
    prompt: Option<&str>,
    args: &[String],
    executor: &Executor,
) -> Result<ExitCode> {
    let guard = AutomationGuard::from_env()?;
    let result = guard.run(executor, name, args, prompt).await?;
    Ok(super::report(&result))
}
