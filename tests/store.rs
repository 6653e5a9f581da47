use compofinder::config::NavRuleConfig;
use compofinder::data::{MarketDataset, SavedComposition, SavedHolding};
use compofinder::engines::metrics::nav_report;
use compofinder::error::CompoError;
use compofinder::types::{Composition, Holding};

fn dataset() -> MarketDataset {
    MarketDataset::new(
        vec!["AAPL".into(), "MSFT".into(), "OR.PA".into()],
        vec![100.0, 50.0, 20.0],
        vec![110.0, 55.0, 19.0],
        vec![1000, 1000, 1000],
        vec![
            vec![1.0, 0.2, 0.0],
            vec![0.2, 1.0, 0.1],
            vec![0.0, 0.1, 1.0],
        ],
    )
    .unwrap()
}

#[test]
fn test_saved_composition_survives_reload() {
    let dataset = dataset();
    let composition =
        Composition::from_holdings(vec![Holding::new(10, 2), Holding::new(20, 0)]).unwrap();

    let path = std::env::temp_dir()
        .join(format!("compofinder_store_{}", std::process::id()))
        .join("best.json");
    SavedComposition::from_composition(&dataset, &composition, Some(1.25))
        .save(&path)
        .unwrap();

    let loaded = SavedComposition::load(&path).unwrap();
    if let Some(parent) = path.parent() {
        std::fs::remove_dir_all(parent).ok();
    }

    assert_eq!(loaded.fitness, Some(1.25));
    assert_eq!(loaded.holdings[0].asset_id, "OR.PA");
    assert_eq!(loaded.resolve(&dataset).unwrap(), composition);
}

#[test]
fn test_unknown_asset_reported() {
    let saved = SavedComposition {
        generated_at: chrono::Utc::now(),
        fitness: None,
        holdings: vec![SavedHolding {
            asset_id: "GOOG".into(),
            shares: 3,
        }],
    };
    assert!(matches!(
        saved.resolve(&dataset()),
        Err(CompoError::UnknownAsset(id)) if id == "GOOG"
    ));
}

#[test]
fn test_nav_report_flags_violations() {
    let dataset = dataset();
    // capital: 1000 + 100 + 200
    let composition = Composition::from_holdings(vec![
        Holding::new(10, 0),
        Holding::new(2, 1),
        Holding::new(10, 2),
    ])
    .unwrap();

    let report = nav_report(&dataset, &composition, &NavRuleConfig::new(0.1, 0.5));
    assert!(!report.is_valid());
    assert_eq!(report.total_capital, 1300.0);

    let flagged: Vec<_> = report.violations().map(|e| e.asset_id.as_str()).collect();
    assert_eq!(flagged, vec!["AAPL", "MSFT"]);

    let text = report.to_string();
    assert!(text.contains("- AAPL"));
    assert!(text.contains("!!!ERROR!!!"));
}
