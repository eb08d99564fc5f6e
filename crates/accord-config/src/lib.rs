mod raw;
pub mod document;
pub mod error;
pub mod hcl;
pub mod settings;
pub mod variables;

pub use document::{ConfigDocument, DocumentBuilder, Fragment};
pub use error::ConfigError;
pub use hcl::{Block, HclValue};
pub use settings::{env_setting, HarnessSettings, ProviderSettings};
pub use variables::Variables;
