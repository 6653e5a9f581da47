use crate::config::NavRuleConfig;
use crate::data::MarketDataset;
use crate::engines::metrics::sharpe::portfolio_capital;
use crate::types::{Composition, ShareCount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether every member's capital weight lies within the rule bounds.
/// Stops at the first violation.
pub fn is_valid(dataset: &MarketDataset, composition: &Composition, rule: &NavRuleConfig) -> bool {
    if !dataset.covers(composition) {
        return false;
    }
    let capital = portfolio_capital(dataset, composition);
    if composition.is_empty() || !(capital > 0.0) {
        return false;
    }

    // TODO: enforce a minimum proportion of stock-type assets once the dataset
    // carries the asset type of each member.
    composition
        .holdings()
        .iter()
        .all(|h| rule.contains(h.shares as f64 * dataset.start_value(h.asset) / capital))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavEntry {
    pub asset_id: String,
    pub shares: ShareCount,
    pub weight: f64,
    pub within_bounds: bool,
}

/// Per-member weights of a composition, violations included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavReport {
    pub total_capital: f64,
    pub entries: Vec<NavEntry>,
}

impl NavReport {
    pub fn is_valid(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.within_bounds)
    }

    pub fn violations(&self) -> impl Iterator<Item = &NavEntry> {
        self.entries.iter().filter(|e| !e.within_bounds)
    }
}

impl fmt::Display for NavReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(
                f,
                "- {} ({:>4}): {:.3}%",
                entry.asset_id,
                entry.shares,
                100.0 * entry.weight
            )?;
            if entry.within_bounds {
                writeln!(f)?;
            } else {
                writeln!(f, "\t!!!ERROR!!!")?;
            }
        }
        Ok(())
    }
}

/// Collect every member's weight instead of stopping at the first violation
///
/// Members outside the dataset are reported as violations with no capital.
pub fn nav_report(dataset: &MarketDataset, composition: &Composition, rule: &NavRuleConfig) -> NavReport {
    let total_capital: f64 = composition
        .holdings()
        .iter()
        .filter(|h| dataset.has_asset(h.asset))
        .map(|h| h.shares as f64 * dataset.start_value(h.asset))
        .sum();

    let entries = composition
        .holdings()
        .iter()
        .map(|h| {
            if !dataset.has_asset(h.asset) {
                return NavEntry {
                    asset_id: format!("#{}", h.asset),
                    shares: h.shares,
                    weight: 0.0,
                    within_bounds: false,
                };
            }
            let weight = if total_capital > 0.0 {
                h.shares as f64 * dataset.start_value(h.asset) / total_capital
            } else {
                0.0
            };
            NavEntry {
                asset_id: dataset.asset_id(h.asset).to_string(),
                shares: h.shares,
                weight,
                within_bounds: total_capital > 0.0 && rule.contains(weight),
            }
        })
        .collect();

    NavReport {
        total_capital,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Holding;

    fn dataset() -> MarketDataset {
        MarketDataset::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![10.0, 10.0, 10.0],
            vec![10.0, 10.0, 10.0],
            vec![100, 100, 100],
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_and_invalid() {
        let rule = NavRuleConfig::new(0.2, 0.5);
        let balanced = Composition::from_holdings(vec![
            Holding::new(10, 0),
            Holding::new(10, 1),
            Holding::new(10, 2),
        ])
        .unwrap();
        assert!(is_valid(&dataset(), &balanced, &rule));

        let skewed = Composition::from_holdings(vec![
            Holding::new(80, 0),
            Holding::new(10, 1),
            Holding::new(10, 2),
        ])
        .unwrap();
        assert!(!is_valid(&dataset(), &skewed, &rule));
    }

    #[test]
    fn test_report_collects_all_violations() {
        let rule = NavRuleConfig::new(0.2, 0.5);
        let skewed = Composition::from_holdings(vec![
            Holding::new(90, 0),
            Holding::new(5, 1),
            Holding::new(5, 2),
        ])
        .unwrap();

        let report = nav_report(&dataset(), &skewed, &rule);
        assert!(!report.is_valid());
        assert_eq!(report.violations().count(), 3);
        assert_eq!(report.total_capital, 1000.0);
        assert!(report.to_string().contains("!!!ERROR!!!"));
    }

    #[test]
    fn test_out_of_range_asset_rejected() {
        let rule = NavRuleConfig::new(0.2, 0.5);
        let compo = Composition::from_holdings(vec![
            Holding::new(10, 0),
            Holding::new(10, 1),
            Holding::new(10, 7),
        ])
        .unwrap();

        assert!(!is_valid(&dataset(), &compo, &rule));
        assert_eq!(crate::engines::metrics::sharpe(&dataset(), &compo), f64::NEG_INFINITY);

        let report = nav_report(&dataset(), &compo, &rule);
        assert!(!report.is_valid());
        assert_eq!(report.total_capital, 200.0);
        assert_eq!(report.entries[2].asset_id, "#7");
        assert!(!report.entries[2].within_bounds);
    }

    #[test]
    fn test_empty_composition_invalid() {
        let rule = NavRuleConfig::default();
        assert!(!is_valid(&dataset(), &Composition::new(), &rule));
        assert!(!nav_report(&dataset(), &Composition::new(), &rule).is_valid());
    }
}
