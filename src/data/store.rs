use crate::data::dataset::MarketDataset;
use crate::error::{CompoError, Result};
use crate::types::{Composition, Holding, ShareCount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Composition persisted by asset identifier, so it survives a reordering of
/// the dataset between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedComposition {
    pub generated_at: DateTime<Utc>,
    pub fitness: Option<f64>,
    pub holdings: Vec<SavedHolding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedHolding {
    pub asset_id: String,
    pub shares: ShareCount,
}

impl SavedComposition {
    pub fn from_composition(
        dataset: &MarketDataset,
        composition: &Composition,
        fitness: Option<f64>,
    ) -> Self {
        let holdings = composition
            .holdings()
            .iter()
            .map(|h| SavedHolding {
                asset_id: dataset.asset_id(h.asset).to_string(),
                shares: h.shares,
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            fitness: fitness.filter(|f| f.is_finite()),
            holdings,
        }
    }

    /// Map asset identifiers back to dataset indices
    pub fn resolve(&self, dataset: &MarketDataset) -> Result<Composition> {
        let mut holdings = Vec::with_capacity(self.holdings.len());
        for saved in &self.holdings {
            let asset = dataset
                .index_of(&saved.asset_id)
                .ok_or_else(|| CompoError::UnknownAsset(saved.asset_id.clone()))?;
            holdings.push(Holding::new(saved.shares, asset));
        }
        Composition::from_holdings(holdings)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CompoError::DataLoading(format!("Could not load portfolio '{}': {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Saved composition to {}", path.display());
        Ok(())
    }
}
