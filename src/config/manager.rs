use super::{
    enumeration::EnumerationConfig, nav_rule::NavRuleConfig, stochastic::StochasticConfig,
    traits::ConfigSection,
};
use crate::error::CompoError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables overriding file values,
/// e.g. `COMPOFINDER_NAV_RULE__MAX_SHARE_PERCENT=0.3`
pub const ENV_PREFIX: &str = "COMPOFINDER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub nav_rule: NavRuleConfig,
    pub enumeration: EnumerationConfig,
    pub stochastic: StochasticConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), CompoError> {
        self.nav_rule.validate()?;
        self.enumeration.validate()?;
        self.stochastic.validate()?;

        let (admitted, rejected): (Vec<usize>, Vec<usize>) = self
            .enumeration
            .sizes()
            .partition(|&size| self.nav_rule.admits_size(size));
        if admitted.is_empty() {
            return Err(CompoError::Configuration(format!(
                "no portfolio size in [{}, {}] can satisfy the NAV rule [{}, {}] with equal weights",
                self.enumeration.min_portfolio_size,
                self.enumeration.max_portfolio_size,
                self.nav_rule.min_share_percent,
                self.nav_rule.max_share_percent
            )));
        }
        if !rejected.is_empty() {
            log::warn!(
                "Portfolio sizes {:?} cannot satisfy the NAV rule [{}, {}] with equal weights",
                rejected,
                self.nav_rule.min_share_percent,
                self.nav_rule.max_share_percent
            );
        }
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CompoError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CompoError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| CompoError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Optional TOML file, then `COMPOFINDER_*` environment overrides
    pub fn load_layered(path: Option<&Path>) -> Result<Self, CompoError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CompoError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| CompoError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| CompoError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}
