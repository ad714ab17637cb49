//! Screening rule sets.
//!
//! A closed set of named strategies that share one evaluation skeleton in
//! [`crate::domain::screening`]: each rule set knows how to fetch and compute
//! its metrics for a symbol, and how to test those metrics.

use crate::domain::error::ScreenerError;
use crate::domain::momentum::{MIN_MOMENTUM_BARS, three_month_return, volume_ratio};
use crate::domain::screen_result::ScreenMetrics;
use crate::domain::statistics::ValueObservations;
use crate::ports::market_data_port::MarketDataPort;

/// Upper P/E bound (exclusive) of the realistic value screen.
pub const REALISTIC_MAX_PE: f64 = 100.0;
/// Minimum dividend yield of the realistic value screen.
pub const REALISTIC_MIN_DIVIDEND_YIELD: f64 = 0.005;

/// Calendar days of history fetched for momentum evaluation.
pub const MOMENTUM_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumParams {
    pub min_return_3m: f64,
    pub min_volume_ratio: f64,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self {
            min_return_3m: 0.05,
            min_volume_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueParams {
    pub max_pe: f64,
    pub min_dividend_yield: f64,
}

impl Default for ValueParams {
    fn default() -> Self {
        Self {
            max_pe: 20.0,
            min_dividend_yield: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleSet {
    Momentum(MomentumParams),
    /// Strict value thresholds.
    Value(ValueParams),
    /// Relaxed value policy with fixed cutoffs.
    RealisticValue,
}

impl RuleSet {
    /// Artifact name of runs produced by this rule set.
    pub fn screen_name(&self) -> &'static str {
        match self {
            RuleSet::Momentum(_) => "momentum_screen",
            RuleSet::Value(_) => "traditional_value_screen",
            RuleSet::RealisticValue => "realistic_value_screen",
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, RuleSet::Value(_) | RuleSet::RealisticValue)
    }

    /// Fetch the data this rule set needs and compute its metrics.
    ///
    /// Value rule sets record every fetched P/E and yield in `observations`,
    /// including symbols that are then rejected for a missing P/E.
    pub fn compute_metrics(
        &self,
        source: &dyn MarketDataPort,
        symbol: &str,
        observations: &mut ValueObservations,
    ) -> Result<ScreenMetrics, ScreenerError> {
        match self {
            RuleSet::Momentum(_) => {
                let history = source.get_history(symbol, MOMENTUM_LOOKBACK_DAYS)?;
                if history.len() < MIN_MOMENTUM_BARS {
                    return Err(ScreenerError::InsufficientData {
                        symbol: symbol.to_string(),
                        bars: history.len(),
                        minimum: MIN_MOMENTUM_BARS,
                    });
                }
                Ok(ScreenMetrics::Momentum {
                    three_month_return: three_month_return(&history)?,
                    volume_ratio: volume_ratio(&history),
                })
            }
            RuleSet::Value(_) | RuleSet::RealisticValue => {
                let info = source.get_info(symbol)?;
                let dividend_yield = info.dividend_yield.unwrap_or(0.0);
                observations.record(info.trailing_pe, dividend_yield);

                match info.trailing_pe {
                    Some(pe_ratio) if pe_ratio > 0.0 => Ok(ScreenMetrics::Value {
                        pe_ratio,
                        dividend_yield,
                    }),
                    _ => Err(ScreenerError::MissingMetric {
                        symbol: symbol.to_string(),
                        metric: "no valid P/E".into(),
                    }),
                }
            }
        }
    }

    /// The rule set's predicate. Metrics of the wrong shape never pass.
    pub fn passes(&self, metrics: &ScreenMetrics) -> bool {
        match (self, metrics) {
            (
                RuleSet::Momentum(params),
                ScreenMetrics::Momentum {
                    three_month_return,
                    volume_ratio,
                },
            ) => {
                *three_month_return >= params.min_return_3m
                    && *volume_ratio >= params.min_volume_ratio
            }
            (
                RuleSet::Value(params),
                ScreenMetrics::Value {
                    pe_ratio,
                    dividend_yield,
                },
            ) => *pe_ratio <= params.max_pe && *dividend_yield >= params.min_dividend_yield,
            (
                RuleSet::RealisticValue,
                ScreenMetrics::Value {
                    pe_ratio,
                    dividend_yield,
                },
            ) => {
                *pe_ratio > 0.0
                    && *pe_ratio < REALISTIC_MAX_PE
                    && *dividend_yield >= REALISTIC_MIN_DIVIDEND_YIELD
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSet::Momentum(p) => write!(
                f,
                "momentum (3m return >= {:.1}%, volume ratio >= {:.2})",
                p.min_return_3m * 100.0,
                p.min_volume_ratio
            ),
            RuleSet::Value(p) => write!(
                f,
                "value (P/E <= {}, dividend yield >= {:.1}%)",
                p.max_pe,
                p.min_dividend_yield * 100.0
            ),
            RuleSet::RealisticValue => write!(
                f,
                "realistic value (0 < P/E < {}, dividend yield >= {:.1}%)",
                REALISTIC_MAX_PE,
                REALISTIC_MIN_DIVIDEND_YIELD * 100.0
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(pe_ratio: f64, dividend_yield: f64) -> ScreenMetrics {
        ScreenMetrics::Value {
            pe_ratio,
            dividend_yield,
        }
    }

    fn momentum(three_month_return: f64, volume_ratio: f64) -> ScreenMetrics {
        ScreenMetrics::Momentum {
            three_month_return,
            volume_ratio,
        }
    }

    #[test]
    fn momentum_thresholds_are_inclusive() {
        let rule = RuleSet::Momentum(MomentumParams {
            min_return_3m: 0.05,
            min_volume_ratio: 0.8,
        });
        assert!(rule.passes(&momentum(0.05, 0.8)));
        assert!(rule.passes(&momentum(0.30, 1.5)));
        assert!(!rule.passes(&momentum(0.049, 1.5)));
        assert!(!rule.passes(&momentum(0.30, 0.79)));
    }

    #[test]
    fn strict_value_predicate() {
        let rule = RuleSet::Value(ValueParams {
            max_pe: 20.0,
            min_dividend_yield: 0.02,
        });
        assert!(rule.passes(&value(20.0, 0.02)));
        assert!(rule.passes(&value(9.5, 0.045)));
        assert!(!rule.passes(&value(28.0, 0.004)));
        assert!(!rule.passes(&value(15.0, 0.019)));
    }

    #[test]
    fn realistic_value_predicate() {
        let rule = RuleSet::RealisticValue;
        assert!(rule.passes(&value(28.0, 0.005)));
        assert!(rule.passes(&value(99.9, 0.03)));
        assert!(!rule.passes(&value(100.0, 0.03)));
        assert!(!rule.passes(&value(28.0, 0.004)));
    }

    #[test]
    fn mismatched_metrics_never_pass() {
        assert!(!RuleSet::RealisticValue.passes(&momentum(1.0, 10.0)));
        assert!(!RuleSet::Momentum(MomentumParams::default()).passes(&value(5.0, 0.1)));
    }

    #[test]
    fn screen_names() {
        assert_eq!(
            RuleSet::Momentum(MomentumParams::default()).screen_name(),
            "momentum_screen"
        );
        assert_eq!(
            RuleSet::Value(ValueParams::default()).screen_name(),
            "traditional_value_screen"
        );
        assert_eq!(RuleSet::RealisticValue.screen_name(), "realistic_value_screen");
    }

    #[test]
    fn display_describes_thresholds() {
        let text = RuleSet::Value(ValueParams::default()).to_string();
        assert_eq!(text, "value (P/E <= 20, dividend yield >= 2.0%)");
    }
}
