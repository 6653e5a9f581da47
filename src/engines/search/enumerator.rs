use crate::config::{EnumerationConfig, EnumerationStrategy, NavRuleConfig};
use crate::data::MarketDataset;
use crate::engines::metrics::{is_valid, sharpe};
use crate::engines::search::combinations::CombinationIter;
use crate::engines::search::fill::fill_composition;
use crate::types::{AssetIndex, Composition, SearchOutcome};

/// Best composition of an enumeration, with the number of complete
/// combinations that were scored
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationOutcome {
    pub best: SearchOutcome,
    pub evaluated: u64,
}

impl EnumerationOutcome {
    pub fn empty() -> Self {
        Self {
            best: SearchOutcome::empty(),
            evaluated: 0,
        }
    }

    /// Fold another outcome in; on equal fitness the current best stays
    pub fn merge(&mut self, other: EnumerationOutcome) {
        self.evaluated += other.evaluated;
        self.best.keep_best(other.best);
    }
}

/// Exhaustive search over fixed-size subsets of the universe, share counts
/// being assigned by the fill rule rather than searched
pub struct ExhaustiveSearch<'a> {
    dataset: &'a MarketDataset,
    rule: NavRuleConfig,
    config: EnumerationConfig,
}

impl<'a> ExhaustiveSearch<'a> {
    pub fn new(dataset: &'a MarketDataset, rule: NavRuleConfig, config: EnumerationConfig) -> Self {
        Self {
            dataset,
            rule,
            config,
        }
    }

    pub fn dataset(&self) -> &'a MarketDataset {
        self.dataset
    }

    pub fn config(&self) -> &EnumerationConfig {
        &self.config
    }

    /// Every configured size, sequentially; ties keep the smaller size
    pub fn run(&self) -> EnumerationOutcome {
        let mut outcome = EnumerationOutcome::empty();
        for size in self.config.sizes() {
            let sized = self.search_size(size);
            log::info!(
                "Size {}: {} combinations, best fitness {:.6}",
                size,
                sized.evaluated,
                sized.best.fitness
            );
            outcome.merge(sized);
        }
        outcome
    }

    /// All combinations of `size` assets
    pub fn search_size(&self, size: usize) -> EnumerationOutcome {
        let n = self.dataset.len();
        if size == 0 || size > n {
            return EnumerationOutcome::empty();
        }

        match self.config.strategy {
            EnumerationStrategy::Successor => self.scan(CombinationIter::new(n, size)),
            EnumerationStrategy::Recursive => {
                let mut outcome = EnumerationOutcome::empty();
                self.descend(&[], 0, size, &mut outcome);
                outcome
            }
        }
    }

    /// Combinations of `size` assets whose smallest index is `first`
    pub fn search_partition(&self, first: AssetIndex, size: usize) -> EnumerationOutcome {
        let n = self.dataset.len();
        if size == 0 || first + size > n {
            return EnumerationOutcome::empty();
        }

        match self.config.strategy {
            EnumerationStrategy::Successor => self.scan(CombinationIter::rooted(first, n, size)),
            EnumerationStrategy::Recursive => {
                let mut outcome = EnumerationOutcome::empty();
                self.descend(&[first], first + 1, size, &mut outcome);
                outcome
            }
        }
    }

    /// Fill and score one set of assets. Compositions breaking the NAV rule
    /// after rounding score `-inf`.
    pub fn score(&self, assets: &[AssetIndex]) -> SearchOutcome {
        let mut composition = Composition::from_assets(assets.iter().copied());
        fill_composition(self.dataset, &mut composition, &self.rule);

        if !is_valid(self.dataset, &composition, &self.rule) {
            return SearchOutcome::new(composition, f64::NEG_INFINITY);
        }
        let fitness = sharpe(self.dataset, &composition);
        SearchOutcome::new(composition, fitness)
    }

    /// Fitness of the filled assets, NAV rule not enforced
    fn filled_fitness(&self, assets: &[AssetIndex]) -> f64 {
        let mut composition = Composition::from_assets(assets.iter().copied());
        fill_composition(self.dataset, &mut composition, &self.rule);
        sharpe(self.dataset, &composition)
    }

    fn scan(&self, combinations: CombinationIter) -> EnumerationOutcome {
        let mut outcome = EnumerationOutcome::empty();
        for assets in combinations {
            outcome.evaluated += 1;
            outcome.best.keep_best(self.score(&assets));
        }
        outcome
    }

    /// Depth-first choice of the next index, each branch owning its prefix
    fn descend(
        &self,
        chosen: &[AssetIndex],
        next: AssetIndex,
        size: usize,
        outcome: &mut EnumerationOutcome,
    ) {
        if chosen.len() == size {
            outcome.evaluated += 1;
            outcome.best.keep_best(self.score(chosen));
            return;
        }

        if let Some(factor) = self.config.prune_factor {
            if chosen.len() >= 2 && outcome.best.fitness > 0.0 {
                let partial = self.filled_fitness(chosen);
                if partial * factor < outcome.best.fitness {
                    return;
                }
            }
        }

        let remaining = size - chosen.len();
        let n = self.dataset.len();
        if next + remaining > n {
            return;
        }
        for asset in next..=(n - remaining) {
            let mut branch = chosen.to_vec();
            branch.push(asset);
            self.descend(&branch, asset + 1, size, outcome);
        }
    }
}
