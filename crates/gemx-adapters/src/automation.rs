use anyhow::{bail, Context, Result};
use gemx_runtime::{ExecutionResult, Executor};
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Overrides the automation directories (`:`-separated on unix).
pub const AUTOMATION_DIR_ENV: &str = "GEMX_AUTOMATION_DIR";

pub const DEFAULT_AUTOMATION_DIR: &str = "./automations";

const AUTOMATION_EXTENSIONS: &[&str] = &["sh", "yaml", "yml"];

/// Resolves automation names inside a fixed set of base directories.
/// A resolved path must stay a descendant of the base it came from;
/// `..` and symlink escapes are refused.
pub struct AutomationGuard {
    bases: Vec<PathBuf>,
}

impl AutomationGuard {
    /// Bases that do not exist are skipped; at least one must remain.
    pub fn new(bases: Vec<PathBuf>) -> Result<Self> {
        let mut resolved = Vec::new();
        for base in bases {
            match base.canonicalize() {
                Ok(base) => resolved.push(base),
                Err(e) => warn!(base = ?base, error = %e, "Skipping automation directory"),
            }
        }
        if resolved.is_empty() {
            bail!("No automation directory found");
        }
        Ok(Self { bases: resolved })
    }

    /// Bases from `GEMX_AUTOMATION_DIR`, or `./automations`.
    pub fn from_env() -> Result<Self> {
        let bases = match std::env::var_os(AUTOMATION_DIR_ENV) {
            Some(value) if !value.is_empty() => std::env::split_paths(&value)
                .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()))
                .collect(),
            _ => vec![PathBuf::from(DEFAULT_AUTOMATION_DIR)],
        };
        Self::new(bases)
    }

    pub fn bases(&self) -> &[PathBuf] {
        &self.bases
    }

    /// Find `name` (with or without extension) under the first base that has it.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let mut candidates = vec![name.to_string()];
        if Path::new(name).extension().is_none() {
            candidates.extend(AUTOMATION_EXTENSIONS.iter().map(|ext| format!("{}.{}", name, ext)));
        }

        for base in &self.bases {
            for candidate in &candidates {
                let joined = base.join(candidate);

                // For existing paths, canonicalize resolves symlinks
                let resolved = if joined.exists() {
                    joined.canonicalize()?
                } else {
                    normalize_path(&joined)
                };

                if !resolved.starts_with(base) {
                    bail!(
                        "Path traversal denied: {:?} is outside automation directory {:?}",
                        name,
                        base
                    );
                }
                if resolved.is_file() {
                    return Ok(resolved);
                }
            }
        }

        bail!("Automation '{}' not found in {:?}", name, self.bases)
    }

    /// Automation names (file stems) across all bases, sorted and deduplicated.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for base in &self.bases {
            let entries = std::fs::read_dir(base)
                .context(format!("Failed to read automation directory: {:?}", base))?;
            for entry in entries {
                let path = entry?.path();
                let known = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| AUTOMATION_EXTENSIONS.contains(&e));
                if !known || !path.is_file() {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Run a resolved automation. Only shell scripts are executable here.
    ///
    /// `args` become the script's positional parameters; `prompt`, when
    /// given, is written to its stdin.
    pub async fn run(
        &self,
        executor: &Executor,
        name: &str,
        args: &[String],
        prompt: Option<&str>,
    ) -> Result<ExecutionResult> {
        let path = self.resolve(name)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "sh" {
            bail!("Automations of type '{}' cannot be run directly", ext);
        }

        info!(automation = ?path, args = args.len(), "Running automation");
        let mut command = vec![path.to_string_lossy().to_string()];
        command.extend_from_slice(args);
        Ok(executor.run_command("sh", &command, prompt).await)
    }
}

/// Normalize a path by resolving `.` and `..` components without filesystem access.
fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for c in path.components() {
        match c {
            Component::ParentDir => {
                // Only pop normal components, never pop root/prefix
                if matches!(parts.last(), Some(Component::Normal(_))) {
                    parts.pop();
                }
            }
            Component::CurDir => {}
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}
