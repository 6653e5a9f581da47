use compofinder::config::{AppConfig, ConfigSection, EnumerationStrategy, NavRuleConfig};
use compofinder::data::connectors::covariance_matrix;
use compofinder::data::MarketDataset;
use compofinder::engines::metrics::is_valid;
use compofinder::engines::search::ParallelSearch;
use compofinder::error::CompoError;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("compofinder_{}_{}", std::process::id(), name))
}

#[test]
fn test_default_config_is_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_save_and_reload() {
    let path = temp_path("roundtrip.toml");
    let mut config = AppConfig::default();
    config.nav_rule = NavRuleConfig::new(0.02, 0.3);
    config.enumeration.strategy = EnumerationStrategy::Recursive;
    config.enumeration.prune_factor = Some(2.0);
    config.stochastic.seed = Some(9);

    config.save_to_file(&path).unwrap();
    let loaded = AppConfig::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let path = temp_path("partial.toml");
    std::fs::write(&path, "[nav_rule]\nmax_share_percent = 0.3\n").unwrap();

    let loaded = AppConfig::load_layered(Some(path.as_path())).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.nav_rule.max_share_percent, 0.3);
    assert_eq!(loaded.nav_rule.min_share_percent, 0.01);
    assert_eq!(loaded.stochastic, AppConfig::default().stochastic);
}

#[test]
fn test_inverted_bounds_rejected() {
    let path = temp_path("inverted.toml");
    std::fs::write(
        &path,
        "[nav_rule]\nmin_share_percent = 0.4\nmax_share_percent = 0.2\n",
    )
    .unwrap();

    let result = AppConfig::load_from_file(&path);
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(CompoError::Configuration(_))));
}

#[test]
fn test_pruning_requires_recursive_strategy() {
    let mut config = AppConfig::default();
    config.enumeration.prune_factor = Some(1.5);
    assert!(config.enumeration.validate().is_err());

    config.enumeration.strategy = EnumerationStrategy::Recursive;
    assert!(config.enumeration.validate().is_ok());
}

fn universe(n: usize) -> MarketDataset {
    let series: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..30)
                .map(|d| 40.0 + i as f64 + 0.1 * (i % 4) as f64 * d as f64 + ((d + 3 * i) as f64 * 0.5).sin())
                .collect()
        })
        .collect();

    MarketDataset::new(
        (0..n).map(|i| format!("S{}", i)).collect(),
        series.iter().map(|s| s[0]).collect(),
        series.iter().map(|s| s[s.len() - 1]).collect(),
        (0..n).map(|i| 2_000 + 100 * i as u64).collect(),
        covariance_matrix(&series),
    )
    .unwrap()
}

#[test]
fn test_default_config_finds_a_composition() {
    let config = AppConfig::default();
    config.validate().unwrap();

    let dataset = universe(14);
    let outcome = ParallelSearch::new(&dataset, config.nav_rule, config.enumeration.clone())
        .run()
        .unwrap();

    assert_eq!(outcome.evaluated, 91);
    assert!(outcome.best.is_found());
    assert_eq!(outcome.best.composition.len(), config.enumeration.max_portfolio_size);
    assert!(is_valid(&dataset, &outcome.best.composition, &config.nav_rule));
}

#[test]
fn test_unsatisfiable_size_range_rejected() {
    let mut config = AppConfig::default();
    config.enumeration.min_portfolio_size = 4;
    config.enumeration.max_portfolio_size = 6;

    assert!(matches!(config.validate(), Err(CompoError::Configuration(_))));

    // one admitted size is enough
    config.enumeration.max_portfolio_size = 10;
    assert!(config.validate().is_ok());
}
