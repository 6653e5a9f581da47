use crate::config::NavRuleConfig;
use crate::data::MarketDataset;
use crate::engines::metrics::sharpe::{self, fitness_from_parts};
use crate::types::{Composition, Holding};

/// Running sums of a composition, so that changing one member's share count
/// is re-scored in O(K) instead of O(K²).
///
/// The cache owns its copy of the holdings. Membership changes are not
/// patched: build a new cache instead.
#[derive(Debug, Clone)]
pub struct FitnessCache {
    holdings: Vec<Holding>,
    buy_values: Vec<f64>,
    start_capital: f64,
    end_capital: f64,
    quadratic_risk: f64,
}

/// State of the cache before `apply_share_delta`, consumed by `revert`
#[derive(Debug, Clone, Copy)]
#[must_use = "a perturbation that is not kept must be reverted"]
pub struct ShareUndo {
    slot: usize,
    shares: u64,
    buy_value: f64,
    start_capital: f64,
    end_capital: f64,
    quadratic_risk: f64,
}

impl FitnessCache {
    pub fn build(dataset: &MarketDataset, composition: &Composition) -> Self {
        let holdings = composition.holdings().to_vec();
        let buy_values = sharpe::buy_values(dataset, composition);
        let start_capital = buy_values.iter().sum();
        let end_capital = sharpe::sell_value(dataset, composition);
        let assets: Vec<_> = composition.assets().collect();
        let quadratic_risk = sharpe::quadratic_risk(dataset, &assets, &buy_values);

        Self {
            holdings,
            buy_values,
            start_capital,
            end_capital,
            quadratic_risk,
        }
    }

    pub fn fitness(&self) -> f64 {
        if self.holdings.is_empty() {
            return f64::NEG_INFINITY;
        }
        fitness_from_parts(self.start_capital, self.end_capital, self.quadratic_risk)
    }

    /// Change the share count of one member by `delta` (saturating at zero).
    ///
    /// With `b` the buy values, `C` the covariance and `d` the buy-value
    /// change of member `s`: `b'Cb` grows by `2d(Cb)_s + d²C_ss`.
    pub fn apply_share_delta(&mut self, dataset: &MarketDataset, slot: usize, delta: i64) -> ShareUndo {
        let undo = ShareUndo {
            slot,
            shares: self.holdings[slot].shares,
            buy_value: self.buy_values[slot],
            start_capital: self.start_capital,
            end_capital: self.end_capital,
            quadratic_risk: self.quadratic_risk,
        };

        let asset = self.holdings[slot].asset;
        let new_shares = (undo.shares as i64 + delta).max(0) as u64;
        let applied = new_shares as f64 - undo.shares as f64;

        let row = dataset.covariance_row(asset);
        let cross: f64 = self
            .holdings
            .iter()
            .zip(&self.buy_values)
            .map(|(h, &b)| b * row[h.asset])
            .sum();

        let d_buy = applied * dataset.start_value(asset);
        self.quadratic_risk += 2.0 * d_buy * cross + d_buy * d_buy * row[asset];
        self.buy_values[slot] += d_buy;
        self.start_capital += d_buy;
        self.end_capital += applied * dataset.end_value(asset);
        self.holdings[slot].shares = new_shares;

        undo
    }

    /// Restore the exact state preceding the matching `apply_share_delta`
    pub fn revert(&mut self, undo: ShareUndo) {
        self.holdings[undo.slot].shares = undo.shares;
        self.buy_values[undo.slot] = undo.buy_value;
        self.start_capital = undo.start_capital;
        self.end_capital = undo.end_capital;
        self.quadratic_risk = undo.quadratic_risk;
    }

    pub fn is_valid(&self, rule: &NavRuleConfig) -> bool {
        if self.holdings.is_empty() || !(self.start_capital > 0.0) {
            return false;
        }
        self.buy_values
            .iter()
            .all(|&b| rule.contains(b / self.start_capital))
    }

    /// Fitness of the holdings computed from scratch
    pub fn recomputed_fitness(&self, dataset: &MarketDataset) -> f64 {
        sharpe::sharpe(dataset, &self.composition())
    }

    /// Rebuild the running sums from scratch; returns the relative drift of
    /// the incremental fitness that was discarded
    pub fn resync(&mut self, dataset: &MarketDataset) -> f64 {
        let before = self.fitness();
        *self = Self::build(dataset, &self.composition());
        let after = self.fitness();

        if before == after {
            0.0
        } else {
            (before - after).abs() / after.abs().max(1.0)
        }
    }

    pub fn composition(&self) -> Composition {
        Composition::from_unique(self.holdings.clone())
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn buy_values(&self) -> &[f64] {
        &self.buy_values
    }

    pub fn start_capital(&self) -> f64 {
        self.start_capital
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> MarketDataset {
        MarketDataset::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![10.0, 20.0, 5.0],
            vec![12.0, 19.0, 6.0],
            vec![1000, 1000, 1000],
            vec![
                vec![4.0, 1.0, -0.5],
                vec![1.0, 9.0, 0.3],
                vec![-0.5, 0.3, 1.0],
            ],
        )
        .unwrap()
    }

    fn composition() -> Composition {
        Composition::from_holdings(vec![
            Holding::new(50, 0),
            Holding::new(20, 1),
            Holding::new(100, 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_incremental_matches_full_recompute() {
        let ds = dataset();
        let mut cache = FitnessCache::build(&ds, &composition());

        let _ = cache.apply_share_delta(&ds, 1, 7);
        let _ = cache.apply_share_delta(&ds, 0, -13);

        let full = cache.recomputed_fitness(&ds);
        assert!((cache.fitness() - full).abs() <= 1e-9 * full.abs().max(1.0));
    }

    #[test]
    fn test_revert_is_exact() {
        let ds = dataset();
        let mut cache = FitnessCache::build(&ds, &composition());
        let original = cache.fitness();
        let start = cache.start_capital();

        let undo = cache.apply_share_delta(&ds, 2, 33);
        assert_ne!(cache.fitness(), original);
        cache.revert(undo);

        assert_eq!(cache.fitness(), original);
        assert_eq!(cache.start_capital(), start);
        assert_eq!(cache.holdings()[2].shares, 100);
    }

    #[test]
    fn test_delta_saturates_at_zero() {
        let ds = dataset();
        let mut cache = FitnessCache::build(&ds, &composition());
        let _ = cache.apply_share_delta(&ds, 1, -500);
        assert_eq!(cache.holdings()[1].shares, 0);
        assert_eq!(cache.buy_values()[1], 0.0);
    }

    #[test]
    fn test_resync_reports_no_drift_when_fresh() {
        let ds = dataset();
        let mut cache = FitnessCache::build(&ds, &composition());
        assert_eq!(cache.resync(&ds), 0.0);
    }
}
