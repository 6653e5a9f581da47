pub mod connectors;
pub mod dataset;
pub mod store;

pub use connectors::{DatasetMetadata, PriceHistoryConnector};
pub use dataset::MarketDataset;
pub use store::{SavedComposition, SavedHolding};
