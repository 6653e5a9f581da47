mod cli;

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{BruteArgs, CheckArgs, Cli, Commands, DatasetArgs, OptimizeArgs};
use compofinder::config::AppConfig;
use compofinder::data::{MarketDataset, PriceHistoryConnector, SavedComposition};
use compofinder::engines::metrics::{nav_report, sharpe, volatility};
use compofinder::engines::search::{
    CancellationToken, LogProgressCallback, ParallelSearch, StochasticOptimizer,
};
use compofinder::types::Composition;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::load_layered(cli.config.as_deref()).context("loading configuration")?;
    let dataset = load_dataset(&cli.source)?;
    log::info!("Dataset loaded: {} assets", dataset.len());

    match cli.command {
        Commands::Check(args) => check(&dataset, &config, args),
        Commands::Brute(args) => brute(&dataset, config, args),
        Commands::Optimize(args) => optimize(&dataset, config, args),
    }
}

fn load_dataset(source: &DatasetArgs) -> Result<MarketDataset> {
    let loaded = match (&source.dataset, &source.prices, &source.liquidity) {
        (Some(path), _, _) => MarketDataset::load_json(path),
        (None, Some(prices), Some(liquidity)) => {
            PriceHistoryConnector::load_dataset(prices, liquidity).map(|(dataset, metadata)| {
                log::info!(
                    "Built dataset from {} ({} days, {} missing prices filled)",
                    metadata.file_path,
                    metadata.num_days,
                    metadata.missing_prices
                );
                dataset
            })
        }
        _ => bail!("either --dataset or --prices with --liquidity is required"),
    };

    let dataset = match loaded {
        Ok(dataset) => dataset,
        Err(err) if err.is_fatal() => {
            log::error!("Dataset is corrupted, aborting: {}", err);
            std::process::exit(1);
        }
        Err(err) => return Err(err).context("loading dataset"),
    };

    if let Some(path) = &source.save_dataset {
        dataset.save_json(path)?;
        log::info!("Dataset snapshot written to {}", path.display());
    }
    Ok(dataset)
}

fn check(dataset: &MarketDataset, config: &AppConfig, args: CheckArgs) -> Result<ExitCode> {
    let saved = SavedComposition::load(&args.portfolio)?;
    let composition = saved.resolve(dataset)?;

    let report = nav_report(dataset, &composition, &config.nav_rule);
    print!("{}", report);
    println!("Total capital: {:.2}", report.total_capital);
    println!("Volatility: {:.6}", volatility(dataset, &composition));
    println!("Fitness: {:.6}", sharpe(dataset, &composition));

    if report.is_valid() {
        println!("Composition is valid");
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "Composition is NOT valid: {} member(s) outside [{}, {}]",
            report.violations().count(),
            config.nav_rule.min_share_percent,
            config.nav_rule.max_share_percent
        );
        Ok(ExitCode::FAILURE)
    }
}

fn brute(dataset: &MarketDataset, mut config: AppConfig, args: BruteArgs) -> Result<ExitCode> {
    if let Some(size) = args.size {
        config.enumeration.min_portfolio_size = size;
        config.enumeration.max_portfolio_size = size;
    }
    if args.threads.is_some() {
        config.enumeration.threads = args.threads;
    }
    config.validate()?;

    let search = ParallelSearch::new(dataset, config.nav_rule, config.enumeration.clone());
    let outcome = search.run()?;
    log::info!("{} combinations evaluated", outcome.evaluated);

    report_best(dataset, &config, &outcome.best.composition, outcome.best.fitness, args.output)
}

fn optimize(dataset: &MarketDataset, mut config: AppConfig, args: OptimizeArgs) -> Result<ExitCode> {
    if args.rounds.is_some() {
        config.stochastic.max_rounds = args.rounds;
    }
    if args.seed.is_some() {
        config.stochastic.seed = args.seed;
    }

    let seed = match &args.portfolio {
        Some(path) => Some(SavedComposition::load(path)?.resolve(dataset)?),
        None => None,
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let mut optimizer = StochasticOptimizer::new(dataset, config.nav_rule, config.stochastic.clone())?;
    let report = optimizer.run(seed.as_ref(), &cancel, LogProgressCallback)?;
    log::info!(
        "{} rounds{}, seed fitness {:.6}, {} elite compositions",
        report.rounds,
        if report.cancelled { " (interrupted)" } else { "" },
        report.seed_fitness,
        report.elites.len()
    );

    report_best(dataset, &config, &report.best.composition, report.best.fitness, args.output)
}

fn report_best(
    dataset: &MarketDataset,
    config: &AppConfig,
    composition: &Composition,
    fitness: f64,
    output: Option<std::path::PathBuf>,
) -> Result<ExitCode> {
    if composition.is_empty() || fitness == f64::NEG_INFINITY {
        log::warn!("No valid composition found");
        return Ok(ExitCode::FAILURE);
    }

    print!("{}", nav_report(dataset, composition, &config.nav_rule));
    println!("Fitness: {:.6}", fitness);

    if let Some(path) = output {
        SavedComposition::from_composition(dataset, composition, Some(fitness)).save(&path)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Raise `cancel` on Ctrl-C from a background thread running its own runtime
fn spawn_interrupt_listener(cancel: CancellationToken) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                log::warn!("Interrupt handling unavailable: {}", err);
                return;
            }
        };
        runtime.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("Received Ctrl+C, finishing current round...");
                    cancel.cancel();
                }
                Err(err) => log::warn!("Failed to listen for Ctrl+C: {}", err),
            }
        });
    });
}
