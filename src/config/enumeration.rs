use super::traits::{invalid, ConfigSection};
use crate::error::CompoError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    pub min_portfolio_size: usize,
    pub max_portfolio_size: usize,
    pub strategy: EnumerationStrategy,
    /// Heuristic: drop a branch whose partial fitness times this factor
    /// is below the current best. Inexact, off by default.
    pub prune_factor: Option<f64>,
    /// Size of the dedicated rayon pool; the global pool when unset
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationStrategy {
    /// In-place "next combination" successor over the free indices
    Successor,
    /// Depth-first choice of increasing indices, copy-on-branch
    Recursive,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            min_portfolio_size: 12,
            max_portfolio_size: 12,
            strategy: EnumerationStrategy::Successor,
            prune_factor: None,
            threads: None,
        }
    }
}

impl EnumerationConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            min_portfolio_size: size,
            max_portfolio_size: size,
            ..Self::default()
        }
    }

    pub fn sizes(&self) -> std::ops::RangeInclusive<usize> {
        self.min_portfolio_size..=self.max_portfolio_size
    }
}

impl ConfigSection for EnumerationConfig {
    fn section_name() -> &'static str {
        "enumeration"
    }

    fn validate(&self) -> Result<(), CompoError> {
        if self.min_portfolio_size == 0 {
            return Err(invalid(
                Self::section_name(),
                "min_portfolio_size must be at least 1",
            ));
        }
        if self.max_portfolio_size < self.min_portfolio_size {
            return Err(invalid(
                Self::section_name(),
                "max_portfolio_size must be >= min_portfolio_size",
            ));
        }
        if let Some(factor) = self.prune_factor {
            if !(factor >= 1.0) {
                return Err(invalid(Self::section_name(), "prune_factor must be >= 1"));
            }
            if self.strategy != EnumerationStrategy::Recursive {
                return Err(invalid(
                    Self::section_name(),
                    "prune_factor requires the recursive strategy",
                ));
            }
        }
        if self.threads == Some(0) {
            return Err(invalid(Self::section_name(), "threads must be at least 1"));
        }
        Ok(())
    }
}
