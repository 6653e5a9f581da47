use crate::config::{NavRuleConfig, StochasticConfig};
use crate::data::MarketDataset;
use crate::engines::evaluation::FitnessCache;
use crate::engines::metrics::{is_valid, sharpe};
use crate::engines::search::cancel::CancellationToken;
use crate::engines::search::fill::fill_composition;
use crate::engines::search::hall_of_fame::{EliteComposition, HallOfFame};
use crate::engines::search::progress::ProgressCallback;
use crate::error::{CompoError, Result};
use crate::types::{AssetIndex, Composition, Holding, SearchOutcome, ShareCount};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::fmt;

/// Upper bound on full sweeps of a single coordinate-ascent pass
const MAX_SWEEPS_PER_PASS: usize = 100_000;

/// Tolerated relative gap between incremental and recomputed fitness
const MAX_CACHE_DRIFT: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
enum RefineStep {
    /// Fraction of the member's share ceiling
    CeilingRatio(f64),
    Fixed(ShareCount),
}

impl RefineStep {
    fn shares(&self, ceiling: ShareCount) -> ShareCount {
        match *self {
            Self::CeilingRatio(ratio) => ((ceiling as f64 * ratio).floor() as ShareCount).max(1),
            Self::Fixed(step) => step,
        }
    }
}

impl fmt::Display for RefineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CeilingRatio(ratio) => write!(f, "ratio={}", ratio),
            Self::Fixed(step) => write!(f, "step={}", step),
        }
    }
}

static REFINE_PASSES: [RefineStep; 3] = [
    RefineStep::CeilingRatio(0.1),
    RefineStep::Fixed(10),
    RefineStep::Fixed(1),
];

/// Outcome of a full stochastic search
#[derive(Debug, Clone)]
pub struct OptimizationReport {
    pub best: SearchOutcome,
    /// Fitness of the seed composition, `-inf` without a valid seed
    pub seed_fitness: f64,
    pub rounds: usize,
    pub cancelled: bool,
    pub elites: Vec<EliteComposition>,
}

/// Local search over share counts and membership of a single composition.
///
/// Share moves are scored through a `FitnessCache` and reverted when they
/// do not strictly improve a NAV-valid fitness. Membership moves replace
/// low-capital members at random and refill the composition.
pub struct StochasticOptimizer<'a> {
    dataset: &'a MarketDataset,
    rule: NavRuleConfig,
    config: StochasticConfig,
    rng: StdRng,
    step_distribution: Normal<f64>,
    accepted_since_resync: usize,
    cancel: CancellationToken,
}

impl<'a> StochasticOptimizer<'a> {
    pub fn new(dataset: &'a MarketDataset, rule: NavRuleConfig, config: StochasticConfig) -> Result<Self> {
        let step_distribution = Normal::new(0.0, config.step_scale)
            .map_err(|e| CompoError::Configuration(format!("Invalid step scale: {}", e)))?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            dataset,
            rule,
            config,
            rng,
            step_distribution,
            accepted_since_resync: 0,
            cancel: CancellationToken::new(),
        })
    }

    /// Working size: the configured target, leaving at least one asset out
    /// of the composition so membership moves stay possible
    pub fn target_size(&self) -> usize {
        let n = self.dataset.len();
        if n <= 1 {
            n
        } else {
            self.config.target_size.min(n - 1)
        }
    }

    /// Search until `cancel` is raised or `max_rounds` rounds have run.
    ///
    /// A valid non-empty `seed` is the initial best, so the returned fitness
    /// is never below the seed's.
    pub fn run<C: ProgressCallback>(
        &mut self,
        seed: Option<&Composition>,
        cancel: &CancellationToken,
        mut callback: C,
    ) -> Result<OptimizationReport> {
        self.cancel = cancel.clone();

        if let Some(seed) = seed {
            if let Some(asset) = seed.assets().find(|&asset| !self.dataset.has_asset(asset)) {
                return Err(CompoError::InvalidComposition(format!(
                    "seed references asset {} outside a universe of {}",
                    asset,
                    self.dataset.len()
                )));
            }
        }

        let mut hall_of_fame = HallOfFame::new(self.config.hall_of_fame_size);
        let mut best = SearchOutcome::empty();

        if let Some(seed) = seed.filter(|c| !c.is_empty()) {
            if is_valid(self.dataset, seed, &self.rule) {
                best = SearchOutcome::new(seed.clone(), sharpe(self.dataset, seed));
                hall_of_fame.try_add(&best);
            } else {
                log::warn!("Seed composition breaks the NAV rule, not kept as baseline");
            }
        }
        let seed_fitness = best.fitness;

        let target = self.target_size();
        if target == 0 {
            return Ok(OptimizationReport {
                best,
                seed_fitness,
                rounds: 0,
                cancelled: false,
                elites: hall_of_fame.into_entries(),
            });
        }

        let mut composition = self.resized(seed, target);
        self.swap_low_capital(&mut composition, true);
        let initial = self.optimize(composition);
        let initial_fitness = initial.fitness;
        hall_of_fame.try_add(&initial);
        if best.keep_best(initial) {
            callback.on_new_best(0, initial_fitness);
        }
        log::info!("Start fitness: {:.6}", best.fitness);

        let mut rounds = 0;
        let mut cancelled = false;
        loop {
            if cancel.is_cancelled() {
                cancelled = true;
                log::info!("Search cancelled after {} rounds", rounds);
                break;
            }
            if self.config.max_rounds.map_or(false, |max| rounds >= max) {
                break;
            }
            rounds += 1;
            callback.on_round_start(rounds);

            let found = best.is_found();
            let mut candidate = if found {
                best.composition.clone()
            } else {
                self.resized(None, target)
            };
            self.swap_low_capital(&mut candidate, !found);

            let outcome = self.optimize(candidate);
            let round_fitness = outcome.fitness;
            hall_of_fame.try_add(&outcome);
            if best.keep_best(outcome) {
                log::info!("New best fitness: {:.6}", round_fitness);
                callback.on_new_best(rounds, round_fitness);
            }
            callback.on_round_complete(rounds, round_fitness, best.fitness);
        }

        log::info!("Final fitness: {:.6}", best.fitness);
        Ok(OptimizationReport {
            best,
            seed_fitness,
            rounds,
            cancelled,
            elites: hall_of_fame.into_entries(),
        })
    }

    /// Share perturbation followed by coordinate ascent on one composition.
    /// The fitness is `-inf` when no NAV-valid state was reached.
    pub fn optimize(&mut self, composition: Composition) -> SearchOutcome {
        let mut cache = FitnessCache::build(self.dataset, &composition);
        self.accepted_since_resync = 0;

        let fitness = self.perturb_shares(&mut cache);
        if self.config.refine_threshold.map_or(true, |t| fitness > t) {
            self.refine(&mut cache);
        }

        self.resync(&mut cache);
        let fitness = if cache.is_valid(&self.rule) {
            cache.fitness()
        } else {
            f64::NEG_INFINITY
        };
        SearchOutcome::new(cache.composition(), fitness)
    }

    /// Random single-member share moves with Gaussian step sizes, cut short
    /// by cancellation; returns the fitness of the state the cache is left in
    pub fn perturb_shares(&mut self, cache: &mut FitnessCache) -> f64 {
        let mut best = self.valid_fitness(cache);
        if cache.is_empty() {
            return best;
        }

        for _ in 0..self.config.perturb_iterations {
            if self.cancel.is_cancelled() {
                break;
            }
            let slot = self.rng.gen_range(0..cache.len());
            let step = self.draw_step();
            let delta = self.clamp_step(cache.holdings()[slot], step);
            if delta == 0 {
                continue;
            }

            let undo = cache.apply_share_delta(self.dataset, slot, delta);
            let fitness = cache.fitness();
            if fitness > best && cache.is_valid(&self.rule) {
                self.note_accepted(cache);
                best = cache.fitness();
            } else {
                cache.revert(undo);
            }
        }

        log::debug!("Share perturbation reached {:.6}", best);
        best
    }

    /// Pattern search: push each member up (then down) by a fixed step while
    /// the fitness strictly improves, sweep until a pass changes nothing, then
    /// move to the next finer step
    pub fn refine(&mut self, cache: &mut FitnessCache) -> f64 {
        let mut best = self.valid_fitness(cache);
        let passes = if self.config.quick_refine {
            &REFINE_PASSES[..1]
        } else {
            &REFINE_PASSES[..]
        };

        for pass in passes {
            let mut sweeps = 0;
            loop {
                let mut improved = false;
                for slot in 0..cache.len() {
                    let asset = cache.holdings()[slot].asset;
                    let step = pass.shares(self.dataset.max_shares(asset)) as i64;

                    let mut moved = false;
                    while self.try_step(cache, slot, step, &mut best) {
                        moved = true;
                    }
                    if !moved {
                        while self.try_step(cache, slot, -step, &mut best) {
                            moved = true;
                        }
                    }
                    improved |= moved;
                }

                sweeps += 1;
                if !improved {
                    break;
                }
                if sweeps >= MAX_SWEEPS_PER_PASS {
                    log::warn!("Coordinate ascent ({}) stopped after {} sweeps", pass, sweeps);
                    break;
                }
            }
            log::debug!("Coordinate ascent ({}) reached {:.6}", pass, best);
        }

        best
    }

    /// Replace every member whose capital is at most a random threshold
    /// (all members with `swap_all`) by a random asset outside the
    /// composition, then refill the share counts
    pub fn swap_low_capital(&mut self, composition: &mut Composition, swap_all: bool) {
        let n = self.dataset.len();
        if composition.is_empty() || n == 0 {
            return;
        }

        let capitals: Vec<f64> = composition
            .holdings()
            .iter()
            .map(|h| h.shares as f64 * self.dataset.start_value(h.asset))
            .collect();
        let min_capital = capitals.iter().copied().fold(f64::INFINITY, f64::min);
        let max_capital = capitals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let threshold = if min_capital < max_capital {
            self.rng.gen_range(min_capital..=max_capital)
        } else {
            min_capital
        };

        if composition.len() < n {
            let mut selected = vec![false; n];
            for asset in composition.assets() {
                selected[asset] = true;
            }

            for (holding, &capital) in composition.holdings_mut().iter_mut().zip(&capitals) {
                if !swap_all && capital > threshold {
                    continue;
                }

                let mut candidate = self.rng.gen_range(0..n);
                while selected[candidate] {
                    candidate = (candidate + 1) % n;
                }

                selected[holding.asset] = false;
                selected[candidate] = true;
                holding.asset = candidate;
            }
        }

        fill_composition(self.dataset, composition, &self.rule);
    }

    fn resized(&self, seed: Option<&Composition>, target: usize) -> Composition {
        let mut assets: Vec<AssetIndex> = seed.map(|c| c.assets().collect()).unwrap_or_default();
        assets.truncate(target);

        let mut next = 0;
        while assets.len() < target && next < self.dataset.len() {
            if !assets.contains(&next) {
                assets.push(next);
            }
            next += 1;
        }
        Composition::from_assets(assets)
    }

    fn valid_fitness(&self, cache: &FitnessCache) -> f64 {
        if cache.is_valid(&self.rule) {
            cache.fitness()
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Non-zero Gaussian step; draws rounding to zero become ±1
    fn draw_step(&mut self) -> i64 {
        let x = self.step_distribution.sample(&mut self.rng);
        match x.round() as i64 {
            0 if x < 0.0 => -1,
            0 => 1,
            step => step,
        }
    }

    fn share_ceiling(&self, holding: Holding) -> ShareCount {
        self.dataset.max_shares(holding.asset).max(holding.shares)
    }

    /// Clamp a step so the member keeps between 1 share and its ceiling
    fn clamp_step(&self, holding: Holding, step: i64) -> i64 {
        let lower = 1 - holding.shares as i64;
        let upper = self.share_ceiling(holding) as i64 - holding.shares as i64;
        if upper < lower {
            return 0;
        }
        step.clamp(lower, upper)
    }

    fn try_step(&mut self, cache: &mut FitnessCache, slot: usize, delta: i64, best: &mut f64) -> bool {
        let holding = cache.holdings()[slot];
        let target = holding.shares as i64 + delta;
        if target < 1 || target > self.share_ceiling(holding) as i64 {
            return false;
        }

        let undo = cache.apply_share_delta(self.dataset, slot, delta);
        let fitness = cache.fitness();
        if fitness > *best && cache.is_valid(&self.rule) {
            self.note_accepted(cache);
            *best = cache.fitness();
            true
        } else {
            cache.revert(undo);
            false
        }
    }

    fn note_accepted(&mut self, cache: &mut FitnessCache) {
        self.accepted_since_resync += 1;
        if self.accepted_since_resync >= self.config.resync_interval {
            self.resync(cache);
        }
    }

    fn resync(&mut self, cache: &mut FitnessCache) {
        self.accepted_since_resync = 0;
        let drift = cache.resync(self.dataset);
        debug_assert!(
            drift < MAX_CACHE_DRIFT,
            "incremental fitness drifted by {:.3e}",
            drift
        );
        if drift > 0.0 {
            log::debug!("Fitness cache resynced, relative drift {:.3e}", drift);
        }
    }
}
