use crate::error::{CompoError, Result};
use crate::types::{AssetIndex, Composition, ShareCount};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read-only description of the asset universe.
///
/// Every array is indexed by `AssetIndex` and has the same length; the
/// constructor refuses anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDataset", into = "RawDataset")]
pub struct MarketDataset {
    asset_ids: Vec<String>,
    start_values: Vec<f64>,
    end_values: Vec<f64>,
    max_shares: Vec<ShareCount>,
    covariance: Vec<Vec<f64>>,
    deployable_capital: Vec<f64>,
}

/// Serialized form, without the derived capital
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDataset {
    asset_ids: Vec<String>,
    start_values: Vec<f64>,
    end_values: Vec<f64>,
    max_shares: Vec<ShareCount>,
    covariance: Vec<Vec<f64>>,
}

impl TryFrom<RawDataset> for MarketDataset {
    type Error = CompoError;

    fn try_from(raw: RawDataset) -> Result<Self> {
        MarketDataset::new(
            raw.asset_ids,
            raw.start_values,
            raw.end_values,
            raw.max_shares,
            raw.covariance,
        )
    }
}

impl From<MarketDataset> for RawDataset {
    fn from(dataset: MarketDataset) -> Self {
        Self {
            asset_ids: dataset.asset_ids,
            start_values: dataset.start_values,
            end_values: dataset.end_values,
            max_shares: dataset.max_shares,
            covariance: dataset.covariance,
        }
    }
}

fn check_len(field: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CompoError::DatasetCorruption {
            field: field.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

impl MarketDataset {
    pub fn new(
        asset_ids: Vec<String>,
        start_values: Vec<f64>,
        end_values: Vec<f64>,
        max_shares: Vec<ShareCount>,
        covariance: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n = start_values.len();
        check_len("end_values", n, end_values.len())?;
        check_len("max_shares", n, max_shares.len())?;
        check_len("asset_ids", n, asset_ids.len())?;
        check_len("covariance", n, covariance.len())?;
        for (i, row) in covariance.iter().enumerate() {
            check_len(&format!("covariance[{}]", i), n, row.len())?;
        }

        let deployable_capital = start_values
            .iter()
            .zip(&max_shares)
            .map(|(value, &shares)| value * shares as f64)
            .collect();

        Ok(Self {
            asset_ids,
            start_values,
            end_values,
            max_shares,
            covariance,
            deployable_capital,
        })
    }

    /// Load a snapshot; mismatched arrays surface as `DatasetCorruption`
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let raw: RawDataset = serde_json::from_str(&contents)?;
        Self::try_from(raw)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.start_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_values.is_empty()
    }

    pub fn has_asset(&self, asset: AssetIndex) -> bool {
        asset < self.start_values.len()
    }

    /// Whether every member of `composition` indexes into this dataset
    pub fn covers(&self, composition: &Composition) -> bool {
        composition.assets().all(|asset| self.has_asset(asset))
    }

    pub fn asset_id(&self, asset: AssetIndex) -> &str {
        &self.asset_ids[asset]
    }

    pub fn asset_ids(&self) -> &[String] {
        &self.asset_ids
    }

    pub fn index_of(&self, asset_id: &str) -> Option<AssetIndex> {
        self.asset_ids.iter().position(|id| id == asset_id)
    }

    pub fn start_value(&self, asset: AssetIndex) -> f64 {
        self.start_values[asset]
    }

    pub fn end_value(&self, asset: AssetIndex) -> f64 {
        self.end_values[asset]
    }

    pub fn max_shares(&self, asset: AssetIndex) -> ShareCount {
        self.max_shares[asset]
    }

    pub fn deployable_capital(&self, asset: AssetIndex) -> f64 {
        self.deployable_capital[asset]
    }

    pub fn covariance(&self, a: AssetIndex, b: AssetIndex) -> f64 {
        self.covariance[a][b]
    }

    pub fn covariance_row(&self, asset: AssetIndex) -> &[f64] {
        &self.covariance[asset]
    }
}
