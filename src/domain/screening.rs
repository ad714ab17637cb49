//! Screening engine.
//!
//! Evaluates a validated universe against one rule set. Each symbol goes
//! through the same skeleton: override check, metric computation, predicate,
//! emit. A failure for one symbol is logged and recorded as a skip; it never
//! aborts the batch.

use crate::domain::error::ScreenerError;
use crate::domain::rule_set::RuleSet;
use crate::domain::screen_result::{ScreenMetrics, ScreenResult};
use crate::domain::statistics::ValueObservations;
use crate::domain::symbol::SymbolRecord;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Symbols force-included in every run regardless of the rule outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideSet {
    symbols: Vec<String>,
    index: HashSet<String>,
}

impl OverrideSet {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = OverrideSet::default();
        for s in symbols {
            let symbol = s.as_ref().trim().to_uppercase();
            if !symbol.is_empty() && set.index.insert(symbol.clone()) {
                set.symbols.push(symbol);
            }
        }
        set
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains(symbol)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    InsufficientData { bars: usize, minimum: usize },
    MissingMetric { metric: String },
    DataSource { reason: String },
    FailedCriteria { metrics: ScreenMetrics },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InsufficientData { bars, minimum } => {
                write!(f, "insufficient data ({} bars, need {})", bars, minimum)
            }
            SkipReason::MissingMetric { metric } => write!(f, "{}", metric),
            SkipReason::DataSource { reason } => write!(f, "data source error: {}", reason),
            SkipReason::FailedCriteria { .. } => write!(f, "failed criteria"),
        }
    }
}

impl From<ScreenerError> for SkipReason {
    fn from(err: ScreenerError) -> Self {
        match err {
            ScreenerError::InsufficientData { bars, minimum, .. } => {
                SkipReason::InsufficientData { bars, minimum }
            }
            ScreenerError::MissingMetric { metric, .. } => SkipReason::MissingMetric { metric },
            ScreenerError::DataSource { reason, .. } => SkipReason::DataSource { reason },
            other => SkipReason::DataSource {
                reason: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Everything one engine invocation produced. Only `results` is persisted;
/// skips and observations feed logs and operator reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenOutcome {
    pub results: Vec<ScreenResult>,
    pub skipped: Vec<SkippedSymbol>,
    pub observations: ValueObservations,
}

impl ScreenOutcome {
    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.metrics().is_some())
            .count()
    }

    pub fn custom_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }
}

pub struct ScreeningEngine<'a> {
    source: &'a dyn MarketDataPort,
}

impl<'a> ScreeningEngine<'a> {
    pub fn new(source: &'a dyn MarketDataPort) -> Self {
        Self { source }
    }

    pub fn screen(
        &self,
        universe: &[SymbolRecord],
        rule_set: &RuleSet,
        overrides: &OverrideSet,
        screen_date: NaiveDate,
    ) -> ScreenOutcome {
        info!(
            screen = rule_set.screen_name(),
            symbols = universe.len(),
            "running {}",
            rule_set
        );
        warn_missing_overrides(universe, overrides);

        let mut outcome = ScreenOutcome::default();
        let mut emitted: HashSet<&str> = HashSet::new();

        for record in universe {
            let symbol = record.symbol.as_str();
            if emitted.contains(symbol) {
                debug!(symbol, "duplicate universe entry ignored");
                continue;
            }

            if overrides.contains(symbol) {
                debug!(symbol, "included (custom symbol)");
                outcome.results.push(ScreenResult::custom(record, screen_date));
                emitted.insert(symbol);
                continue;
            }

            let metrics =
                match rule_set.compute_metrics(self.source, symbol, &mut outcome.observations) {
                    Ok(m) => m,
                    Err(e) => {
                        if matches!(e, ScreenerError::DataSource { .. }) {
                            warn!(symbol, error = %e, "skipping symbol");
                        } else {
                            debug!(symbol, reason = %e, "skipping symbol");
                        }
                        outcome.skipped.push(SkippedSymbol {
                            symbol: symbol.to_string(),
                            reason: e.into(),
                        });
                        continue;
                    }
                };

            if rule_set.passes(&metrics) {
                debug!(symbol, ?metrics, "passed");
                outcome
                    .results
                    .push(ScreenResult::passed(record, screen_date, metrics));
                emitted.insert(symbol);
            } else {
                debug!(symbol, ?metrics, "failed criteria");
                outcome.skipped.push(SkippedSymbol {
                    symbol: symbol.to_string(),
                    reason: SkipReason::FailedCriteria { metrics },
                });
            }
        }

        info!(
            screen = rule_set.screen_name(),
            results = outcome.results.len(),
            skipped = outcome.skipped.len(),
            "screen complete"
        );
        outcome
    }
}

/// Override extraction alone: the custom symbols present in the universe,
/// in universe order, with no data fetched.
pub fn custom_symbols_only(
    universe: &[SymbolRecord],
    overrides: &OverrideSet,
    screen_date: NaiveDate,
) -> Vec<ScreenResult> {
    warn_missing_overrides(universe, overrides);
    let mut seen = HashSet::new();
    universe
        .iter()
        .filter(|r| overrides.contains(&r.symbol) && seen.insert(r.symbol.as_str()))
        .map(|r| ScreenResult::custom(r, screen_date))
        .collect()
}

fn warn_missing_overrides(universe: &[SymbolRecord], overrides: &OverrideSet) {
    let present: HashSet<&str> = universe.iter().map(|r| r.symbol.as_str()).collect();
    for symbol in overrides.symbols() {
        if !present.contains(symbol.as_str()) {
            warn!(symbol = %symbol, "custom symbol not found in validated universe");
        }
    }
}
