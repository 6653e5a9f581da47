use super::traits::{invalid, ConfigSection};
use crate::error::CompoError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticConfig {
    /// Number of members the optimizer works with
    pub target_size: usize,
    /// Random share perturbations per round
    pub perturb_iterations: usize,
    /// Standard deviation (in shares) of a perturbation step
    pub step_scale: f64,
    /// Only run the coarsest coordinate-ascent pass
    pub quick_refine: bool,
    /// Skip coordinate ascent below this fitness
    pub refine_threshold: Option<f64>,
    /// Outer-loop budget; unbounded (until cancelled) when unset
    pub max_rounds: Option<usize>,
    /// Accepted steps between full recomputations of the fitness cache
    pub resync_interval: usize,
    pub hall_of_fame_size: usize,
    pub seed: Option<u64>,
}

impl Default for StochasticConfig {
    fn default() -> Self {
        Self {
            target_size: 20,
            perturb_iterations: 5000,
            step_scale: 50.0,
            quick_refine: false,
            refine_threshold: None,
            max_rounds: None,
            resync_interval: 256,
            hall_of_fame_size: 10,
            seed: None,
        }
    }
}

impl ConfigSection for StochasticConfig {
    fn section_name() -> &'static str {
        "stochastic"
    }

    fn validate(&self) -> Result<(), CompoError> {
        if self.target_size == 0 {
            return Err(invalid(Self::section_name(), "target_size must be at least 1"));
        }
        if !(self.step_scale > 0.0) || !self.step_scale.is_finite() {
            return Err(invalid(
                Self::section_name(),
                "step_scale must be a positive number",
            ));
        }
        if self.resync_interval == 0 {
            return Err(invalid(
                Self::section_name(),
                "resync_interval must be at least 1",
            ));
        }
        if self.hall_of_fame_size == 0 {
            return Err(invalid(
                Self::section_name(),
                "hall_of_fame_size must be at least 1",
            ));
        }
        Ok(())
    }
}
