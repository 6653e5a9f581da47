use super::{types::DatasetMetadata, validator::DataValidator};
use crate::data::dataset::MarketDataset;
use crate::error::{CompoError, Result};
use crate::types::ShareCount;
use polars::prelude::*;
use std::path::Path;

/// Builds a `MarketDataset` from daily price history.
///
/// The price file is wide: an optional date column, then one numeric column
/// per asset. The liquidity file holds a single row with the maximum number of
/// shares obtainable for each of those assets.
pub struct PriceHistoryConnector;

impl PriceHistoryConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| CompoError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    pub fn load_dataset<P: AsRef<Path>, Q: AsRef<Path>>(
        prices_path: P,
        liquidity_path: Q,
    ) -> Result<(MarketDataset, DatasetMetadata)> {
        let prices = Self::load(&prices_path)?;
        let liquidity = Self::load(&liquidity_path)?;

        let (dataset, mut metadata) = Self::build_dataset(&prices, &liquidity)?;
        metadata.file_path = prices_path.as_ref().to_string_lossy().to_string();
        Ok((dataset, metadata))
    }

    pub fn build_dataset(
        prices: &DataFrame,
        liquidity: &DataFrame,
    ) -> Result<(MarketDataset, DatasetMetadata)> {
        let assets = DataValidator::asset_columns(prices)?;
        DataValidator::validate_minimum_rows(prices, 2)?;
        DataValidator::validate_liquidity(liquidity, &assets)?;

        let null_report = DataValidator::check_nulls(prices)?;
        if !null_report.is_empty() {
            log::warn!("Missing prices filled from previous day: {:?}", null_report);
        }
        let missing_prices = null_report.iter().map(|(_, count)| count).sum();

        let mut series = Vec::with_capacity(assets.len());
        for asset in &assets {
            series.push(Self::forward_filled(prices, asset)?);
        }

        let start_values = series.iter().map(|s| s[0]).collect();
        let end_values = series.iter().map(|s| s[s.len() - 1]).collect();

        let mut max_shares = Vec::with_capacity(assets.len());
        for asset in &assets {
            max_shares.push(Self::share_ceiling(liquidity, asset)?);
        }

        let covariance = covariance_matrix(&series);

        let metadata = DatasetMetadata {
            file_path: String::new(),
            num_days: prices.height(),
            num_assets: assets.len(),
            date_column: DataValidator::date_column(prices),
            missing_prices,
        };

        let dataset = MarketDataset::new(assets, start_values, end_values, max_shares, covariance)?;
        Ok((dataset, metadata))
    }

    /// Daily values of one asset, a missing day repeating the previous one
    /// (zero before the first quote)
    fn forward_filled(df: &DataFrame, asset: &str) -> Result<Vec<f64>> {
        let column = df.column(asset)?.cast(&DataType::Float64)?;
        let values = column.f64()?;

        let mut last = 0.0;
        Ok(values
            .into_iter()
            .map(|value| {
                if let Some(v) = value {
                    last = v;
                }
                last
            })
            .collect())
    }

    fn share_ceiling(liquidity: &DataFrame, asset: &str) -> Result<ShareCount> {
        let column = liquidity.column(asset)?.cast(&DataType::Float64)?;
        let value = column.f64()?.get(0).unwrap_or(0.0);
        Ok(if value > 0.0 { value.floor() as ShareCount } else { 0 })
    }
}

/// Population covariance of every pair of daily series
pub fn covariance_matrix(series: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let means: Vec<f64> = series
        .iter()
        .map(|s| s.iter().sum::<f64>() / s.len().max(1) as f64)
        .collect();

    let n = series.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let days = series[i].len().min(series[j].len());
            let sum: f64 = series[i]
                .iter()
                .zip(&series[j])
                .map(|(x, y)| (x - means[i]) * (y - means[j]))
                .sum();
            let cov = if days > 0 { sum / days as f64 } else { 0.0 };
            matrix[i][j] = cov;
            matrix[j][i] = cov;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_build_dataset() {
        let prices = df! {
            "date" => &["2016-06-01", "2016-06-02", "2016-06-03"],
            "AAA" => &[10.0, 12.0, 14.0],
            "BBB" => &[5.0, 5.0, 5.0],
        }
        .unwrap();
        let liquidity = df! {
            "AAA" => &[100i64],
            "BBB" => &[40i64],
        }
        .unwrap();

        let (dataset, metadata) = PriceHistoryConnector::build_dataset(&prices, &liquidity).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.asset_id(0), "AAA");
        assert_eq!(dataset.start_value(0), 10.0);
        assert_eq!(dataset.end_value(0), 14.0);
        assert_eq!(dataset.max_shares(1), 40);
        assert_eq!(dataset.deployable_capital(1), 200.0);
        // mean 12, deviations -2, 0, 2
        assert!((dataset.covariance(0, 0) - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(dataset.covariance(1, 1), 0.0);
        assert_eq!(dataset.covariance(0, 1), 0.0);
        assert_eq!(metadata.num_days, 3);
        assert_eq!(metadata.date_column.as_deref(), Some("date"));
    }

    #[test]
    fn test_missing_prices_forward_filled() {
        let prices = df! {
            "AAA" => &[Some(10.0), None, Some(14.0)],
        }
        .unwrap();
        let liquidity = df! {
            "AAA" => &[10i64],
        }
        .unwrap();

        let (dataset, metadata) = PriceHistoryConnector::build_dataset(&prices, &liquidity).unwrap();

        assert_eq!(metadata.missing_prices, 1);
        assert_eq!(dataset.end_value(0), 14.0);
        // filled series 10, 10, 14
        let mean = 34.0_f64 / 3.0;
        let expected = ((10.0 - mean).powi(2) * 2.0 + (14.0 - mean).powi(2)) / 3.0;
        assert!((dataset.covariance(0, 0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_covariance_symmetric() {
        let series = vec![vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 2.0]];
        let matrix = covariance_matrix(&series);
        assert_eq!(matrix[0][1], matrix[1][0]);
        assert!((matrix[0][1] - (-0.5 / 1.5)).abs() < 1e-12);
    }
}
