use compofinder::data::connectors::covariance_matrix;
use compofinder::data::MarketDataset;
use compofinder::engines::evaluation::FitnessCache;
use compofinder::types::{Composition, Holding};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn universe(n: usize) -> MarketDataset {
    let series: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..25)
                .map(|d| 50.0 + i as f64 + ((d + i) as f64 * 0.3).sin() * (i + 1) as f64)
                .collect()
        })
        .collect();

    MarketDataset::new(
        (0..n).map(|i| format!("S{}", i)).collect(),
        series.iter().map(|s| s[0]).collect(),
        series.iter().map(|s| s[s.len() - 1]).collect(),
        vec![10_000; n],
        covariance_matrix(&series),
    )
    .unwrap()
}

#[test]
fn test_long_random_walk_stays_in_sync() {
    let dataset = universe(12);
    let composition = Composition::from_holdings(
        (0..12).map(|asset| Holding::new(100 + 10 * asset as u64, asset)).collect(),
    )
    .unwrap();

    let mut cache = FitnessCache::build(&dataset, &composition);
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..20_000 {
        let slot = rng.gen_range(0..cache.len());
        let delta = rng.gen_range(-20..=20);
        if cache.holdings()[slot].shares as i64 + delta < 1 {
            continue;
        }
        let undo = cache.apply_share_delta(&dataset, slot, delta);
        if rng.gen_bool(0.5) {
            cache.revert(undo);
        }
    }

    let full = cache.recomputed_fitness(&dataset);
    assert!((cache.fitness() - full).abs() <= 1e-9 * full.abs().max(1.0));
    assert!(cache.resync(&dataset) < 1e-9);
    assert_eq!(cache.fitness(), full);
}

#[test]
fn test_empty_composition_scores_negative_infinity() {
    let dataset = universe(3);
    let cache = FitnessCache::build(&dataset, &Composition::new());
    assert_eq!(cache.fitness(), f64::NEG_INFINITY);
}
