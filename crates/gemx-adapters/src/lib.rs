pub mod actions;
pub mod automation;
pub mod pipe;

pub use actions::{Action, ActionCatalog, ActionKind, ActionRunner, CATALOG_FILE};
pub use automation::{AutomationGuard, AUTOMATION_DIR_ENV};
pub use pipe::{shell_line, GenerationPipe, PipeMode};
