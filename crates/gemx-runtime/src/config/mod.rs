pub mod document;
pub mod store;

pub use document::ConfigDocument;
pub use store::{default_config_path, ConfigStore, DEFAULT_CONFIG_PATH};
