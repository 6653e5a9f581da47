mod csv;
mod types;
mod validator;

pub use csv::{covariance_matrix, PriceHistoryConnector};
pub use types::{DatasetMetadata, DATE_ALIASES};
pub use validator::DataValidator;
