use crate::config::NavRuleConfig;
use crate::data::MarketDataset;
use crate::types::Composition;

/// Assign share counts deterministically: every member receives the capital
/// `(max_share_percent / min_share_percent) * min_cap`, where `min_cap` is the
/// smallest deployable capital among the members, rounded down to whole shares.
pub fn fill_composition(dataset: &MarketDataset, composition: &mut Composition, rule: &NavRuleConfig) {
    let min_cap = composition
        .assets()
        .map(|asset| dataset.deployable_capital(asset))
        .fold(f64::INFINITY, f64::min);
    if !min_cap.is_finite() {
        return;
    }

    let cap_ceiling = rule.fill_ratio() * min_cap;
    for holding in composition.holdings_mut() {
        let price = dataset.start_value(holding.asset);
        holding.shares = if price > 0.0 {
            (cap_ceiling / price).floor() as u64
        } else {
            0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_equalizes_capital() {
        let dataset = MarketDataset::new(
            vec!["A".into(), "B".into()],
            vec![10.0, 25.0],
            vec![10.0, 25.0],
            vec![100, 10],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        let rule = NavRuleConfig::new(0.2, 0.8);

        let mut compo = Composition::from_assets([0, 1]);
        fill_composition(&dataset, &mut compo, &rule);

        // min_cap = 250, ceiling = 4 * 250
        assert_eq!(compo.holdings()[0].shares, 100);
        assert_eq!(compo.holdings()[1].shares, 40);
    }
}
