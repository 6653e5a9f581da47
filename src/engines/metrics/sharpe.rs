//! Return-over-volatility objective.
//!
//! `fitness = (end_capital / start_capital - 1) / (volatility + 1e-8)` where
//! `volatility = sqrt(b' C b) / start_capital` and `b` holds each member's
//! buy value. Empty or zero-capital compositions score `-inf`.

use crate::data::MarketDataset;
use crate::types::{AssetIndex, Composition};

/// Added to the volatility so a riskless composition does not divide by zero
pub const VOLATILITY_EPSILON: f64 = 1e-8;

/// Capital needed to buy the composition at period start
pub fn portfolio_capital(dataset: &MarketDataset, composition: &Composition) -> f64 {
    composition
        .holdings()
        .iter()
        .map(|h| h.shares as f64 * dataset.start_value(h.asset))
        .sum()
}

/// Value of the composition at period end
pub fn sell_value(dataset: &MarketDataset, composition: &Composition) -> f64 {
    composition
        .holdings()
        .iter()
        .map(|h| h.shares as f64 * dataset.end_value(h.asset))
        .sum()
}

/// Buy value of every member, in composition order
pub fn buy_values(dataset: &MarketDataset, composition: &Composition) -> Vec<f64> {
    composition
        .holdings()
        .iter()
        .map(|h| h.shares as f64 * dataset.start_value(h.asset))
        .collect()
}

/// `Σ_i Σ_j b_i b_j cov[a_i][a_j]`
pub fn quadratic_risk(dataset: &MarketDataset, assets: &[AssetIndex], buy_values: &[f64]) -> f64 {
    let mut total = 0.0;
    for (i, &asset_i) in assets.iter().enumerate() {
        let row = dataset.covariance_row(asset_i);
        let inner: f64 = assets
            .iter()
            .zip(buy_values)
            .map(|(&asset_j, &b_j)| b_j * row[asset_j])
            .sum();
        total += buy_values[i] * inner;
    }
    total
}

/// Fitness from the aggregated sums; shared with the incremental cache
pub fn fitness_from_parts(start_capital: f64, end_capital: f64, quadratic_risk: f64) -> f64 {
    if !(start_capital > 0.0) {
        return f64::NEG_INFINITY;
    }
    let volatility = quadratic_risk.max(0.0).sqrt() / start_capital;
    let fitness = (end_capital / start_capital - 1.0) / (volatility + VOLATILITY_EPSILON);
    if fitness.is_nan() {
        f64::NEG_INFINITY
    } else {
        fitness
    }
}

/// `sqrt(b'Cb) / start_capital`; infinite without capital or when a member
/// lies outside the dataset
pub fn volatility(dataset: &MarketDataset, composition: &Composition) -> f64 {
    if !dataset.covers(composition) {
        return f64::INFINITY;
    }
    let buys = buy_values(dataset, composition);
    let start_capital: f64 = buys.iter().sum();
    if !(start_capital > 0.0) {
        return f64::INFINITY;
    }
    let assets: Vec<_> = composition.assets().collect();
    quadratic_risk(dataset, &assets, &buys).max(0.0).sqrt() / start_capital
}

/// Score a composition from scratch
pub fn sharpe(dataset: &MarketDataset, composition: &Composition) -> f64 {
    if composition.is_empty() || !dataset.covers(composition) {
        return f64::NEG_INFINITY;
    }
    let buys = buy_values(dataset, composition);
    let assets: Vec<_> = composition.assets().collect();
    let start_capital: f64 = buys.iter().sum();
    let end_capital = sell_value(dataset, composition);
    fitness_from_parts(start_capital, end_capital, quadratic_risk(dataset, &assets, &buys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Holding;

    fn dataset() -> MarketDataset {
        MarketDataset::new(
            vec!["A".into(), "B".into()],
            vec![10.0, 20.0],
            vec![11.0, 18.0],
            vec![100, 100],
            vec![vec![4.0, 1.0], vec![1.0, 9.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_sharpe_matches_hand_computation() {
        let compo = Composition::from_holdings(vec![Holding::new(10, 0), Holding::new(5, 1)]).unwrap();
        // b = [100, 100]; b'Cb = 100*100*(4 + 1 + 1 + 9)
        let quad = 100.0 * 100.0 * 15.0;
        let vol = f64::sqrt(quad) / 200.0;
        let ret = (110.0 + 90.0) / 200.0 - 1.0;
        let expected = ret / (vol + VOLATILITY_EPSILON);
        assert!((sharpe(&dataset(), &compo) - expected).abs() < 1e-12);
        assert!((volatility(&dataset(), &compo) - vol).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_asset_not_scored() {
        let ds = dataset();
        let compo = Composition::from_holdings(vec![Holding::new(10, 0), Holding::new(5, 2)]).unwrap();
        assert_eq!(sharpe(&ds, &compo), f64::NEG_INFINITY);
        assert_eq!(volatility(&ds, &compo), f64::INFINITY);
    }

    #[test]
    fn test_degenerate_inputs_score_neg_infinity() {
        let ds = dataset();
        assert_eq!(sharpe(&ds, &Composition::new()), f64::NEG_INFINITY);
        let zero = Composition::from_holdings(vec![Holding::new(0, 0)]).unwrap();
        assert_eq!(sharpe(&ds, &zero), f64::NEG_INFINITY);
    }

    #[test]
    fn test_zero_volatility_uses_epsilon() {
        assert!(fitness_from_parts(100.0, 110.0, 0.0) > 1e6);
        assert_eq!(fitness_from_parts(100.0, 100.0, 0.0), 0.0);
    }
}
