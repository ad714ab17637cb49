//! Symbol lists and cross-screen overlap derived from persisted runs.

use crate::domain::screen_result::ScreenRun;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Screen types whose runs are projected into symbol lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Momentum,
    RealisticValue,
    TraditionalValue,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 3] = [
        ScreenKind::Momentum,
        ScreenKind::RealisticValue,
        ScreenKind::TraditionalValue,
    ];

    pub fn screen_type(&self) -> &'static str {
        match self {
            ScreenKind::Momentum => "momentum_screen",
            ScreenKind::RealisticValue => "realistic_value_screen",
            ScreenKind::TraditionalValue => "traditional_value_screen",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScreenKind::Momentum => "Momentum Stocks",
            ScreenKind::RealisticValue => "Realistic Value Stocks",
            ScreenKind::TraditionalValue => "Traditional Value Stocks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedSymbol {
    pub symbol: String,
    pub sector: String,
    pub market_cap: u64,
    pub current_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_month_return: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedSymbolList {
    pub screen_name: String,
    pub created_date: NaiveDateTime,
    pub total_symbols: usize,
    pub symbols: Vec<DetailedSymbol>,
}

/// Symbols of a run in result order.
pub fn symbol_list(run: &ScreenRun) -> Vec<String> {
    run.symbols()
}

pub fn detailed_symbol_list(
    run: &ScreenRun,
    display_name: &str,
    created: NaiveDateTime,
) -> DetailedSymbolList {
    let symbols: Vec<DetailedSymbol> = run
        .results
        .iter()
        .map(|r| DetailedSymbol {
            symbol: r.symbol.clone(),
            sector: r.sector.clone(),
            market_cap: r.market_cap,
            current_price: r.current_price,
            three_month_return: r.three_month_return,
            volume_ratio: r.three_month_return.map(|_| r.volume_ratio.unwrap_or(0.0)),
            pe_ratio: r.pe_ratio,
            dividend_yield: r.pe_ratio.map(|_| r.dividend_yield.unwrap_or(0.0)),
        })
        .collect();

    DetailedSymbolList {
        screen_name: display_name.to_string(),
        created_date: created,
        total_symbols: symbols.len(),
        symbols,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairOverlap {
    pub left: String,
    pub right: String,
    pub symbols: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlapSummary {
    pub counts: Vec<(String, usize)>,
    pub pairs: Vec<PairOverlap>,
    /// Symbols present in every screen.
    pub common: BTreeSet<String>,
}

impl OverlapSummary {
    /// `None` when fewer than two screens are available.
    pub fn compute(screens: &[(String, Vec<String>)]) -> Option<Self> {
        if screens.len() < 2 {
            return None;
        }

        let sets: Vec<BTreeSet<String>> = screens
            .iter()
            .map(|(_, symbols)| symbols.iter().cloned().collect())
            .collect();

        let counts = screens
            .iter()
            .zip(&sets)
            .map(|((name, _), set)| (name.clone(), set.len()))
            .collect();

        let mut pairs = Vec::new();
        for i in 0..screens.len() {
            for j in (i + 1)..screens.len() {
                pairs.push(PairOverlap {
                    left: screens[i].0.clone(),
                    right: screens[j].0.clone(),
                    symbols: sets[i].intersection(&sets[j]).cloned().collect(),
                });
            }
        }

        let mut common = sets[0].clone();
        for set in &sets[1..] {
            common = common.intersection(set).cloned().collect();
        }

        Some(OverlapSummary {
            counts,
            pairs,
            common,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screen_result::{ScreenMetrics, ScreenResult};
    use crate::domain::symbol::SymbolRecord;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn names(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn screen_kind_names() {
        assert_eq!(ScreenKind::Momentum.screen_type(), "momentum_screen");
        assert_eq!(
            ScreenKind::TraditionalValue.display_name(),
            "Traditional Value Stocks"
        );
    }

    #[test]
    fn detailed_list_carries_screen_metrics() {
        let date = at().date();
        let run = ScreenRun::new(
            "momentum_screen",
            at(),
            vec![
                ScreenResult::passed(
                    &SymbolRecord::bare("NVDA"),
                    date,
                    ScreenMetrics::Momentum {
                        three_month_return: 0.21,
                        volume_ratio: 1.4,
                    },
                ),
                ScreenResult::custom(&SymbolRecord::bare("XOM"), date),
            ],
        );

        let detailed = detailed_symbol_list(&run, "Momentum Stocks", at());
        assert_eq!(detailed.screen_name, "Momentum Stocks");
        assert_eq!(detailed.total_symbols, 2);
        assert_eq!(detailed.symbols[0].three_month_return, Some(0.21));
        assert_eq!(detailed.symbols[0].volume_ratio, Some(1.4));
        assert_eq!(detailed.symbols[0].pe_ratio, None);
        assert_eq!(detailed.symbols[1].three_month_return, None);
        assert_eq!(symbol_list(&run), names(&["NVDA", "XOM"]));
    }

    #[test]
    fn overlap_requires_two_screens() {
        let screens = vec![("momentum_screen".to_string(), names(&["AAPL"]))];
        assert_eq!(OverlapSummary::compute(&screens), None);
    }

    #[test]
    fn overlap_pairs_and_common() {
        let screens = vec![
            ("momentum_screen".to_string(), names(&["AAPL", "XOM", "CVX", "NVDA"])),
            ("realistic_value_screen".to_string(), names(&["XOM", "CVX", "KO"])),
            ("traditional_value_screen".to_string(), names(&["CVX", "PFE", "XOM"])),
        ];
        let summary = OverlapSummary::compute(&screens).unwrap();

        assert_eq!(summary.counts[0], ("momentum_screen".to_string(), 4));
        assert_eq!(summary.pairs.len(), 3);
        assert_eq!(
            summary.pairs[0].symbols,
            ["CVX", "XOM"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<String>>()
        );
        assert_eq!(
            summary.common.iter().cloned().collect::<Vec<_>>(),
            names(&["CVX", "XOM"])
        );
    }

    #[test]
    fn overlap_empty_screen_has_no_common() {
        let screens = vec![
            ("momentum_screen".to_string(), names(&["AAPL"])),
            ("realistic_value_screen".to_string(), vec![]),
        ];
        let summary = OverlapSummary::compute(&screens).unwrap();
        assert!(summary.common.is_empty());
    }
}
