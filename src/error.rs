use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompoError {
    #[error("Corrupted dataset: {field} has {actual} entries, expected {expected}")]
    DatasetCorruption {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid composition: {0}")]
    InvalidComposition(String),

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

impl CompoError {
    /// Data corruption cannot be worked around; callers abort on it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DatasetCorruption { .. })
    }
}

pub type Result<T> = std::result::Result<T, CompoError>;
