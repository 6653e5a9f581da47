use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "compofinder",
    about = "Search constrained portfolio compositions maximizing a Sharpe-like ratio"
)]
pub struct Cli {
    #[command(flatten)]
    pub source: DatasetArgs,

    /// TOML configuration; COMPOFINDER_* environment variables override it
    #[arg(long, global = true, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Dataset snapshot in JSON
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        conflicts_with_all = ["prices", "liquidity"]
    )]
    pub dataset: Option<PathBuf>,

    /// Daily prices, one column per asset
    #[arg(long, global = true, value_name = "FILE", requires = "liquidity")]
    pub prices: Option<PathBuf>,

    /// Maximum obtainable shares, one column per asset
    #[arg(long, global = true, value_name = "FILE", requires = "prices")]
    pub liquidity: Option<PathBuf>,

    /// Write the loaded dataset as a JSON snapshot
    #[arg(long = "save-dataset", global = true, value_name = "FILE")]
    pub save_dataset: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify a saved composition against the NAV rule
    Check(CheckArgs),
    /// Exhaustive search over every combination of the configured sizes
    Brute(BruteArgs),
    /// Stochastic local search, stopped with Ctrl-C or a round budget
    Optimize(OptimizeArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[arg(long, value_name = "FILE")]
    pub portfolio: PathBuf,
}

#[derive(Args, Debug)]
pub struct BruteArgs {
    /// Where to save the best composition
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Override the configured portfolio size (min and max)
    #[arg(long)]
    pub size: Option<usize>,

    /// Worker threads; rayon's global pool when omitted
    #[arg(long)]
    pub threads: Option<usize>,
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Seed composition
    #[arg(long, value_name = "FILE")]
    pub portfolio: Option<PathBuf>,

    /// Where to save the best composition
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Stop after this many rounds
    #[arg(long)]
    pub rounds: Option<usize>,

    /// RNG seed for a reproducible search
    #[arg(long)]
    pub seed: Option<u64>,
}
