use std::path::Path;

use anyhow::{bail, Context, Result};
use gemx_runtime::{ConfigDocument, ExecutionResult, Executor, SessionState};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::automation::AutomationGuard;

/// Catalog file name, looked up next to `config.json` by default.
pub const CATALOG_FILE: &str = "others.json";

/// Replaced by the output of `git diff --staged` in prompt actions.
pub const STAGED_DIFF_PLACEHOLDER: &str = "$(git diff --staged)";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionKind {
    /// Generate from a literal prompt.
    Prompt { prompt: String },
    /// Run a command line through `sh -c`.
    Shell { command: String },
    /// Generate from `templates.<template_key>` in config.json.
    Template { template_key: String },
    /// Run an automation file through the automation guard.
    Automation { file: String },
}

/// One labelled entry of the `actions` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Action {
    pub label: String,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ActionKind::Prompt { .. } => "prompt",
            ActionKind::Shell { .. } => "shell",
            ActionKind::Template { .. } => "template",
            ActionKind::Automation { .. } => "automation",
        }
    }
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    actions: Vec<Value>,
}

/// The `actions` section of an `others.json` catalog.
///
/// Entries with an unknown `type` or missing fields are skipped with a
/// warning; the rest of the catalog stays usable.
#[derive(Debug, Default)]
pub struct ActionCatalog {
    actions: Vec<Action>,
}

impl ActionCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read action catalog: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid action catalog: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(content)?;
        let mut actions = Vec::with_capacity(raw.actions.len());
        for entry in raw.actions {
            match serde_json::from_value::<Action>(entry) {
                Ok(action) => actions.push(action),
                Err(e) => warn!(error = %e, "Skipping catalog action"),
            }
        }
        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn find(&self, label: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.label == label)
    }
}

/// Executes catalog actions against one session.
pub struct ActionRunner<'a> {
    executor: &'a Executor,
    state: &'a SessionState,
    config: &'a ConfigDocument,
    automations: Option<&'a AutomationGuard>,
}

impl<'a> ActionRunner<'a> {
    pub fn new(executor: &'a Executor, state: &'a SessionState, config: &'a ConfigDocument) -> Self {
        Self {
            executor,
            state,
            config,
            automations: None,
        }
    }

    pub fn with_automations(mut self, guard: &'a AutomationGuard) -> Self {
        self.automations = Some(guard);
        self
    }

    pub async fn run(&self, action: &Action) -> Result<ExecutionResult> {
        info!(label = %action.label, kind = action.type_name(), "Running action");
        match &action.kind {
            ActionKind::Prompt { prompt } => {
                let prompt = self.expand_prompt(prompt).await?;
                Ok(self.executor.generate(&prompt, self.state).await)
            }
            ActionKind::Shell { command } => Ok(self
                .executor
                .run_command_grouped("sh", &["-c".to_string(), command.clone()], None)
                .await),
            ActionKind::Template { template_key } => {
                let Some(prompt) = self.config.template(template_key) else {
                    bail!("Template '{}' not found in config", template_key);
                };
                Ok(self.executor.generate(prompt, self.state).await)
            }
            ActionKind::Automation { file } => {
                let Some(guard) = self.automations else {
                    bail!("No automation directory available for '{}'", file);
                };
                guard.run(self.executor, file, &[], None).await
            }
        }
    }

    async fn expand_prompt(&self, prompt: &str) -> Result<String> {
        if !prompt.contains(STAGED_DIFF_PLACEHOLDER) {
            return Ok(prompt.to_string());
        }
        let Some(git) = self.executor.resolve("git") else {
            bail!("git not found; cannot expand {}", STAGED_DIFF_PLACEHOLDER);
        };

        let diff = self
            .executor
            .run_command(&git, &["diff".to_string(), "--staged".to_string()], None)
            .await;
        if !diff.is_success() {
            bail!(
                "'git diff --staged' failed: {}",
                diff.failure_message()
                    .unwrap_or_else(|| diff.stderr().trim().to_string())
            );
        }
        if diff.stdout().is_empty() {
            warn!("No staged changes; prompt will have an empty diff");
        }
        Ok(prompt.replace(STAGED_DIFF_PLACEHOLDER, diff.stdout()))
    }
}
