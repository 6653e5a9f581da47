use super::types::DATE_ALIASES;
use crate::error::{CompoError, Result};
use polars::prelude::*;

pub struct DataValidator;

impl DataValidator {
    /// Asset columns of a wide price table: every column except the date index,
    /// each of which must be numeric
    pub fn asset_columns(df: &DataFrame) -> Result<Vec<String>> {
        let mut columns = Vec::new();

        for name in df.get_column_names() {
            if DATE_ALIASES.contains(&name.as_str()) {
                continue;
            }
            let column = df.column(name.as_str())?;
            if !Self::is_numeric(column.dtype()) {
                return Err(CompoError::DataLoading(format!(
                    "Column '{}' must be numeric, found {:?}",
                    name,
                    column.dtype()
                )));
            }
            columns.push(name.to_string());
        }

        if columns.is_empty() {
            return Err(CompoError::DataLoading(
                "No asset columns found".to_string(),
            ));
        }
        Ok(columns)
    }

    /// Find the date index column, if any
    pub fn date_column(df: &DataFrame) -> Option<String> {
        let columns = df.get_column_names();
        DATE_ALIASES
            .iter()
            .find(|&&alias| columns.iter().any(|col| col.as_str() == alias))
            .map(|alias| alias.to_string())
    }

    /// Check for minimum required rows
    pub fn validate_minimum_rows(df: &DataFrame, min_rows: usize) -> Result<()> {
        if df.height() < min_rows {
            return Err(CompoError::DataLoading(format!(
                "Insufficient data: {} rows, minimum {} required",
                df.height(),
                min_rows
            )));
        }
        Ok(())
    }

    /// The liquidity table must carry one row and every asset column
    pub fn validate_liquidity(liquidity: &DataFrame, assets: &[String]) -> Result<()> {
        if liquidity.height() != 1 {
            return Err(CompoError::DataLoading(format!(
                "Liquidity table must have exactly one row, found {}",
                liquidity.height()
            )));
        }
        for asset in assets {
            let column = liquidity.column(asset).map_err(|_| {
                CompoError::DataLoading(format!("Missing liquidity for asset '{}'", asset))
            })?;
            if !Self::is_numeric(column.dtype()) {
                return Err(CompoError::DataLoading(format!(
                    "Liquidity of '{}' must be numeric, found {:?}",
                    asset,
                    column.dtype()
                )));
            }
        }
        Ok(())
    }

    /// Null count per column, for columns that have any
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for col_name in df.get_column_names() {
            let null_count = df.column(col_name.as_str())?.null_count();
            if null_count > 0 {
                null_report.push((col_name.to_string(), null_count));
            }
        }

        Ok(null_report)
    }

    fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float64
                | DataType::Float32
                | DataType::Int64
                | DataType::Int32
                | DataType::UInt64
                | DataType::UInt32
        )
    }
}
