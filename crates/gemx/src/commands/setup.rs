use gemx_runtime::Executor;
use std::process::ExitCode;

/// Report which external tools are available.
pub fn execute(executor: &Executor) -> ExitCode {
    let report = executor.check_dependencies();

    match &report.jq {
        Some(path) => println!("ok   jq: {}", path.display()),
        None => println!("miss jq not found, please install it"),
    }
    match &report.generation_binary {
        Some(path) => println!("ok   gemini binary: {}", path.display()),
        None => println!(
            "miss no binary ({}) found on PATH",
            executor.searched_names().join(" or ")
        ),
    }

    if report.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
