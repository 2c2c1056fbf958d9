mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{ActionCommands, AutoCommands, Cli, Commands, ConfigCommands, ProfileCommands};
use gemx_runtime::{ConfigStore, Executor};
use std::process::ExitCode;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize logging
    gemx_runtime::init_logging(cli.quiet);

    let store = match &cli.config {
        Some(path) => ConfigStore::new(shellexpand::tilde(&path.to_string_lossy()).into_owned()),
        None => ConfigStore::at_default_path(),
    };
    let executor = Executor::new(Duration::from_secs(cli.timeout));

    // Dispatch to command
    let code = match cli.command {
        Commands::Generate {
            prompt,
            model,
            temperature,
            profile,
            pipe_to,
            shell,
        } => {
            let request = commands::generate::GenerateRequest {
                prompt,
                model,
                temperature,
                profile,
                pipe_to,
                shell,
            };
            commands::generate::execute(request, &store, &executor).await?
        }
        Commands::Profile { action } => match action {
            ProfileCommands::Apply { name } => commands::profile::apply(&name, &store)?,
            ProfileCommands::List => commands::profile::list(&store),
        },
        Commands::Config { action } => match action {
            ConfigCommands::Get { key } => commands::config::get(&key, &store)?,
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value, &store)?,
            ConfigCommands::Show => commands::config::show(&store)?,
            ConfigCommands::Path => commands::config::path(&store),
        },
        Commands::Template { key } => commands::template::execute(&key, &store, &executor).await?,
        Commands::Models => commands::models::execute(&executor).await,
        Commands::Setup => commands::setup::execute(&executor),
        Commands::Auto { action } => match action {
            AutoCommands::List => commands::auto::list()?,
            AutoCommands::Run { name, prompt, args } => {
                commands::auto::run(&name, prompt.as_deref(), &args, &executor).await?
            }
        },
        Commands::Action { action } => match action {
            ActionCommands::List { catalog } => commands::action::list(catalog, &store)?,
            ActionCommands::Run { label, catalog } => {
                commands::action::run(&label, catalog, &store, &executor).await?
            }
        },
        Commands::Init { force } => commands::init::run_init(&store, force)?,
    };

    Ok(code)
}
