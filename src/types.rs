use crate::error::{CompoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Index of an asset in the dataset arrays (and in the covariance matrix)
pub type AssetIndex = usize;

/// Number of shares bought for an asset
pub type ShareCount = u64;

/// One member of a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Holding {
    pub shares: ShareCount,
    pub asset: AssetIndex,
}

impl Holding {
    pub fn new(shares: ShareCount, asset: AssetIndex) -> Self {
        Self { shares, asset }
    }
}

/// Ordered set of holdings with unique asset indices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    holdings: Vec<Holding>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a composition, rejecting duplicated assets
    pub fn from_holdings(holdings: Vec<Holding>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(holdings.len());
        for holding in &holdings {
            if !seen.insert(holding.asset) {
                return Err(CompoError::InvalidComposition(format!(
                    "asset {} appears more than once",
                    holding.asset
                )));
            }
        }
        Ok(Self { holdings })
    }

    /// Members for the given assets, with zero shares until filled.
    /// The caller guarantees the indices are distinct (combination output).
    pub fn from_assets<I>(assets: I) -> Self
    where
        I: IntoIterator<Item = AssetIndex>,
    {
        Self {
            holdings: assets.into_iter().map(|asset| Holding::new(0, asset)).collect(),
        }
    }

    /// Holdings already known to carry distinct assets
    pub(crate) fn from_unique(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Share counts may be edited in place; asset indices must stay unique.
    pub fn holdings_mut(&mut self) -> &mut [Holding] {
        &mut self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn contains(&self, asset: AssetIndex) -> bool {
        self.holdings.iter().any(|h| h.asset == asset)
    }

    pub fn assets(&self) -> impl Iterator<Item = AssetIndex> + '_ {
        self.holdings.iter().map(|h| h.asset)
    }

    /// Order-independent key used to deduplicate compositions
    pub fn canonical_key(&self) -> String {
        let mut members: Vec<_> = self.holdings.iter().map(|h| (h.asset, h.shares)).collect();
        members.sort_unstable();
        members
            .iter()
            .map(|(asset, shares)| format!("{}:{}", asset, shares))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Best composition found by a search, with its fitness.
/// An empty composition with `-inf` fitness means nothing was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub composition: Composition,
    pub fitness: f64,
}

impl SearchOutcome {
    pub fn empty() -> Self {
        Self {
            composition: Composition::new(),
            fitness: f64::NEG_INFINITY,
        }
    }

    pub fn new(composition: Composition, fitness: f64) -> Self {
        Self { composition, fitness }
    }

    pub fn is_found(&self) -> bool {
        !self.composition.is_empty() && self.fitness > f64::NEG_INFINITY
    }

    /// Replace self when `other` is strictly better; ties keep the first found.
    pub fn keep_best(&mut self, other: SearchOutcome) -> bool {
        if other.fitness > self.fitness {
            *self = other;
            true
        } else {
            false
        }
    }
}

impl Default for SearchOutcome {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_assets_rejected() {
        let result = Composition::from_holdings(vec![Holding::new(1, 3), Holding::new(2, 3)]);
        assert!(matches!(result, Err(CompoError::InvalidComposition(_))));
    }

    #[test]
    fn test_canonical_key_ignores_order() {
        let a = Composition::from_holdings(vec![Holding::new(5, 1), Holding::new(7, 0)]).unwrap();
        let b = Composition::from_holdings(vec![Holding::new(7, 0), Holding::new(5, 1)]).unwrap();
        assert_eq!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn test_keep_best_prefers_first_on_tie() {
        let mut best = SearchOutcome::new(Composition::from_assets([0]), 1.0);
        assert!(!best.keep_best(SearchOutcome::new(Composition::from_assets([1]), 1.0)));
        assert!(best.composition.contains(0));
        assert!(best.keep_best(SearchOutcome::new(Composition::from_assets([2]), 1.5)));
        assert!(best.composition.contains(2));
    }

    #[test]
    fn test_empty_outcome_not_found() {
        assert!(!SearchOutcome::empty().is_found());
    }
}
