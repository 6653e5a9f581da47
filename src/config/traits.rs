use crate::error::CompoError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), CompoError>;
}

pub(crate) fn invalid(section: &str, message: impl Into<String>) -> CompoError {
    CompoError::Configuration(format!("[{}] {}", section, message.into()))
}
