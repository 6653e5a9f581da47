use serde::{Deserialize, Serialize};

/// Column names recognised as the date index of a price file
pub const DATE_ALIASES: [&str; 6] = ["date", "datetime", "time", "timestamp", "Date", "DateTime"];

/// Metadata about a loaded price history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub file_path: String,
    pub num_days: usize,
    pub num_assets: usize,
    pub date_column: Option<String>,
    /// Prices filled from the previous day
    pub missing_prices: usize,
}
