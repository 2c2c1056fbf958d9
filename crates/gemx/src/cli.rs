use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Apply a named profile and show the resulting settings
    Apply {
        /// Profile name under `profiles` in config.json
        name: String,
    },
    /// List profile names
    List,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the value at a dot-separated key path
    Get {
        /// Key path, e.g. `plugins.web_fetch`
        key: String,
    },
    /// Set the value at a dot-separated key path
    Set {
        /// Key path, e.g. `plugins.web_fetch`
        key: String,
        /// JSON value; anything that does not parse as JSON is stored as a string
        value: String,
    },
    /// Print the whole config document
    Show,
    /// Print the config file location
    Path,
}

#[derive(Subcommand)]
pub enum AutoCommands {
    /// List available automations
    List,
    /// Run a shell automation by name
    Run {
        /// Automation name, with or without extension
        name: String,
        /// Text written to the automation's stdin
        #[arg(long)]
        prompt: Option<String>,
        /// Extra arguments passed to the automation
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ActionCommands {
    /// List catalog actions as `label<TAB>type`
    List {
        /// Catalog file; defaults to others.json next to config.json
        #[arg(long, env = "GEMX_CATALOG")]
        catalog: Option<PathBuf>,
    },
    /// Run a catalog action by label
    Run {
        /// Action label, as shown by `action list`
        label: String,
        /// Catalog file; defaults to others.json next to config.json
        #[arg(long, env = "GEMX_CATALOG")]
        catalog: Option<PathBuf>,
    },
}

#[derive(Parser)]
#[command(name = "gemx")]
#[command(about = "gemx - config-driven wrapper around the gemini CLI", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true, env = "GEMX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for the external binary before killing it
    #[arg(long, global = true, env = "GEMX_TIMEOUT", default_value = "120")]
    pub timeout: u64,

    /// Only log errors
    #[arg(long, global = true, env = "GEMX_QUIET")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate text from a prompt (argument or stdin)
    Generate {
        /// Prompt text; read from stdin when omitted
        prompt: Option<String>,
        /// Model override for this run
        #[arg(long)]
        model: Option<String>,
        /// Temperature override for this run
        #[arg(long)]
        temperature: Option<f64>,
        /// Apply a profile before overrides
        #[arg(long)]
        profile: Option<String>,
        /// Pipe generated text into this command
        #[arg(long, num_args = 1.., allow_hyphen_values = true)]
        pipe_to: Vec<String>,
        /// Compose the pipe as a quoted shell line instead of wiring processes directly
        #[arg(long, requires = "pipe_to")]
        shell: bool,
    },
    /// Manage profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Read and write config.json
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Run a prompt stored under `templates`
    Template {
        /// Template key
        key: String,
    },
    /// List models known to the gemini binary
    Models,
    /// Check for the gemini binary and jq
    Setup,
    /// Automation catalog
    Auto {
        #[command(subcommand)]
        action: AutoCommands,
    },
    /// Action catalog (others.json)
    Action {
        #[command(subcommand)]
        action: ActionCommands,
    },
    /// Write a starter config.json
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
