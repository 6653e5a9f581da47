use crate::config::{EnumerationConfig, NavRuleConfig};
use crate::data::MarketDataset;
use crate::engines::search::enumerator::{EnumerationOutcome, ExhaustiveSearch};
use crate::error::{CompoError, Result};
use crate::types::AssetIndex;
use rayon::prelude::*;

/// Result of one worker: every combination of `size` assets starting at
/// `first_asset`
#[derive(Debug, Clone)]
pub struct PartitionOutcome {
    pub size: usize,
    pub first_asset: AssetIndex,
    pub outcome: EnumerationOutcome,
}

/// Fans the exhaustive search out over the first chosen asset index.
///
/// Workers share the dataset read-only and each returns an owned outcome;
/// outcomes are reduced in partition order so the winner matches the
/// sequential search, ties included.
pub struct ParallelSearch<'a> {
    search: ExhaustiveSearch<'a>,
}

impl<'a> ParallelSearch<'a> {
    pub fn new(dataset: &'a MarketDataset, rule: NavRuleConfig, config: EnumerationConfig) -> Self {
        Self {
            search: ExhaustiveSearch::new(dataset, rule, config),
        }
    }

    /// `(size, first_asset)` of every worker, sizes ascending
    pub fn partitions(&self) -> Vec<(usize, AssetIndex)> {
        let n = self.search.dataset().len();
        self.search
            .config()
            .sizes()
            .filter(|&size| size > 0 && size <= n)
            .flat_map(|size| (0..=n - size).map(move |first| (size, first)))
            .collect()
    }

    pub fn run(&self) -> Result<EnumerationOutcome> {
        let outcomes = match self.search.config().threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| {
                        CompoError::Configuration(format!("Failed to build thread pool: {}", e))
                    })?;
                pool.install(|| self.run_partitions())
            }
            None => self.run_partitions(),
        };

        Ok(Self::reduce(outcomes))
    }

    pub fn run_partitions(&self) -> Vec<PartitionOutcome> {
        let partitions = self.partitions();
        log::info!("Searching {} partitions", partitions.len());

        partitions
            .into_par_iter()
            .map(|(size, first_asset)| {
                let outcome = self.search.search_partition(first_asset, size);
                log::info!(
                    "Partition (size {}, first asset {}) complete: {} combinations, best fitness {:.6}",
                    size,
                    first_asset,
                    outcome.evaluated,
                    outcome.best.fitness
                );
                PartitionOutcome {
                    size,
                    first_asset,
                    outcome,
                }
            })
            .collect()
    }

    /// Maximum fitness; on ties the earliest partition wins
    pub fn reduce(outcomes: Vec<PartitionOutcome>) -> EnumerationOutcome {
        outcomes
            .into_iter()
            .fold(EnumerationOutcome::empty(), |mut acc, partition| {
                acc.merge(partition.outcome);
                acc
            })
    }
}
