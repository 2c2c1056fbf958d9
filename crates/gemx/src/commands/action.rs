use anyhow::Result;
use gemx_adapters::{ActionCatalog, ActionRunner, AutomationGuard, CATALOG_FILE};
use gemx_runtime::{ConfigStore, Executor, SessionState};
use std::path::PathBuf;
use std::process::ExitCode;

fn catalog_path(catalog: Option<PathBuf>, store: &ConfigStore) -> PathBuf {
    match catalog {
        Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned()),
        None => store.path().with_file_name(CATALOG_FILE),
    }
}

pub fn list(catalog: Option<PathBuf>, store: &ConfigStore) -> Result<ExitCode> {
    let catalog = ActionCatalog::load(&catalog_path(catalog, store))?;
    for action in catalog.actions() {
        println!("{}\t{}", action.label, action.type_name());
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn run(
    label: &str,
    catalog: Option<PathBuf>,
    store: &ConfigStore,
    executor: &Executor,
) -> Result<ExitCode> {
    let catalog = ActionCatalog::load(&catalog_path(catalog, store))?;
    let Some(action) = catalog.find(label) else {
        let labels: Vec<&str> = catalog.actions().iter().map(|a| a.label.as_str()).collect();
        eprintln!("Action '{}' not found. Available: {}", label, labels.join(", "));
        return Ok(ExitCode::FAILURE);
    };

    let state = SessionState::from_store(store);
    let config = store.read();
    // Automation actions need a directory; the others run without one
    let guard = AutomationGuard::from_env().ok();
    let mut runner = ActionRunner::new(executor, &state, &config);
    if let Some(guard) = &guard {
        runner = runner.with_automations(guard);
    }

    let result = runner.run(action).await?;
    Ok(super::report(&result))
}
