use super::traits::{invalid, ConfigSection};
use crate::error::CompoError;
use serde::{Deserialize, Serialize};

/// Bounds on each member's share of the portfolio capital (%NAV rule)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavRuleConfig {
    pub min_share_percent: f64,
    pub max_share_percent: f64,
}

impl Default for NavRuleConfig {
    fn default() -> Self {
        Self {
            min_share_percent: 0.01,
            max_share_percent: 0.1,
        }
    }
}

impl NavRuleConfig {
    pub fn new(min_share_percent: f64, max_share_percent: f64) -> Self {
        Self {
            min_share_percent,
            max_share_percent,
        }
    }

    pub fn contains(&self, weight: f64) -> bool {
        weight >= self.min_share_percent && weight <= self.max_share_percent
    }

    /// Multiplier applied to the weakest deployable capital by the fill rule
    pub fn fill_ratio(&self) -> f64 {
        self.max_share_percent / self.min_share_percent
    }

    /// Composition sizes for which equal weights can satisfy the rule
    pub fn admits_size(&self, size: usize) -> bool {
        size > 0 && self.contains(1.0 / size as f64)
    }
}

impl ConfigSection for NavRuleConfig {
    fn section_name() -> &'static str {
        "nav_rule"
    }

    fn validate(&self) -> Result<(), CompoError> {
        if !(self.min_share_percent > 0.0) {
            return Err(invalid(
                Self::section_name(),
                "min_share_percent must be positive",
            ));
        }
        if self.max_share_percent <= self.min_share_percent {
            return Err(invalid(
                Self::section_name(),
                "max_share_percent must be greater than min_share_percent",
            ));
        }
        if self.max_share_percent > 1.0 {
            return Err(invalid(
                Self::section_name(),
                "max_share_percent cannot exceed 1",
            ));
        }
        Ok(())
    }
}
