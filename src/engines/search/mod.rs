pub mod cancel;
pub mod combinations;
pub mod enumerator;
pub mod fill;
pub mod hall_of_fame;
pub mod parallel;
pub mod progress;
pub mod stochastic;

pub use cancel::CancellationToken;
pub use combinations::{combination_count, next_combination, CombinationIter};
pub use enumerator::{EnumerationOutcome, ExhaustiveSearch};
pub use fill::fill_composition;
pub use hall_of_fame::{EliteComposition, HallOfFame};
pub use parallel::{ParallelSearch, PartitionOutcome};
pub use progress::{
    ChannelProgressCallback, LogProgressCallback, ProgressCallback, ProgressMessage,
};
pub use stochastic::{OptimizationReport, StochasticOptimizer};
