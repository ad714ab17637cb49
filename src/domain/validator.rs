//! Symbol validation and universe construction.
//!
//! Fetches history and metadata per symbol and classifies it valid or
//! invalid against data-quality and liquidity thresholds. Every applicable
//! check runs so an invalid record lists all of its failures.

use crate::domain::error::ScreenerError;
use crate::domain::symbol::{InvalidRecord, SymbolInfo, SymbolRecord};
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

pub const MIN_DATA_POINTS: usize = 200;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 730;
pub const DEFAULT_INDEX: &str = "sp500";

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationCriteria {
    pub min_market_cap: u64,
    pub min_avg_volume: f64,
    /// Disabled when `None`.
    pub min_price: Option<f64>,
    pub required_fields: Vec<String>,
    pub lookback_days: i64,
}

impl Default for ValidationCriteria {
    fn default() -> Self {
        Self {
            min_market_cap: 0,
            min_avg_volume: 0.0,
            min_price: None,
            required_fields: Vec::new(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniverseConfig {
    pub include_index: bool,
    pub index: String,
    pub custom_symbols: Vec<String>,
    pub criteria: ValidationCriteria,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolValidation {
    Valid(SymbolRecord),
    Invalid(InvalidRecord),
}

pub fn validate_symbol(
    source: &dyn MarketDataPort,
    symbol: &str,
    criteria: &ValidationCriteria,
) -> SymbolValidation {
    let invalid = |reasons: Vec<String>, data_points: usize| {
        SymbolValidation::Invalid(InvalidRecord {
            symbol: symbol.to_string(),
            reasons,
            data_points,
        })
    };

    let history = match source.get_history(symbol, criteria.lookback_days) {
        Ok(h) => h,
        Err(e) => {
            warn!(symbol, error = %e, "history fetch failed");
            let cause = match e {
                ScreenerError::DataSource { reason, .. } => reason,
                other => other.to_string(),
            };
            return invalid(vec![format!("Error validating {}: {}", symbol, cause)], 0);
        }
    };

    if history.is_empty() {
        return invalid(vec!["No historical data available".to_string()], 0);
    }

    let info = source.get_info(symbol).unwrap_or_else(|e| {
        debug!(symbol, error = %e, "info unavailable, using defaults");
        SymbolInfo::default()
    });

    let market_cap = info.market_cap.unwrap_or(0);
    let avg_volume = history.mean_volume();
    let current_price = history.last_close().unwrap_or(0.0);
    let data_points = history.len();
    let mut reasons = Vec::new();

    if market_cap > 0 && market_cap < criteria.min_market_cap {
        reasons.push(format!("Market cap too low: ${}", group_thousands(market_cap)));
    }

    // NaN compares false against every threshold.
    if !avg_volume.is_finite() {
        reasons.push("Average volume unavailable".to_string());
    } else if avg_volume < criteria.min_avg_volume {
        reasons.push(format!(
            "Average volume too low: {}",
            group_thousands(avg_volume.round() as u64)
        ));
    }

    if !current_price.is_finite() {
        reasons.push("Price unavailable".to_string());
    } else if let Some(min_price) = criteria.min_price {
        if current_price < min_price {
            reasons.push(format!("Price too low: ${:.2}", current_price));
        }
    }

    if data_points < MIN_DATA_POINTS {
        reasons.push(format!("Insufficient data history: {} days", data_points));
    }

    let missing: Vec<&str> = criteria
        .required_fields
        .iter()
        .filter(|f| !history.has_field(f))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        reasons.push(format!("Missing required data fields: [{}]", missing.join(", ")));
    }

    if !reasons.is_empty() {
        return invalid(reasons, data_points);
    }

    SymbolValidation::Valid(
        SymbolRecord {
            market_cap,
            avg_volume,
            current_price,
            data_points,
            data_start: history.first_date(),
            data_end: history.last_date(),
            ..SymbolRecord::bare(symbol)
        }
        .with_metadata(&info),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseSummary {
    pub total_tested: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub validation_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolUniverse {
    pub valid_symbols: Vec<SymbolRecord>,
    pub invalid_symbols: Vec<InvalidRecord>,
    pub summary: UniverseSummary,
}

impl SymbolUniverse {
    /// Valid symbols per sector, largest first, ties by sector name.
    pub fn sector_distribution(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.valid_symbols {
            *counts.entry(record.sector.as_str()).or_default() += 1;
        }
        let mut distribution: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(sector, n)| (sector.to_string(), n))
            .collect();
        distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        distribution
    }
}

/// Union of the index list (when enabled) and the custom symbols,
/// upper-cased and deduplicated, in sorted order.
pub fn collect_symbols(source: &dyn MarketDataPort, config: &UniverseConfig) -> Vec<String> {
    let mut all: BTreeSet<String> = BTreeSet::new();

    if config.include_index {
        match source.list_index_symbols(&config.index) {
            Ok(symbols) => {
                info!(index = %config.index, count = symbols.len(), "added index symbols");
                all.extend(normalize(symbols));
            }
            Err(e) => warn!(index = %config.index, error = %e, "index list unavailable"),
        }
    }

    info!(count = config.custom_symbols.len(), "added custom symbols");
    all.extend(normalize(config.custom_symbols.iter().cloned()));
    all.into_iter().collect()
}

pub fn build_symbol_universe(
    source: &dyn MarketDataPort,
    config: &UniverseConfig,
    validated_at: NaiveDateTime,
) -> SymbolUniverse {
    let symbols = collect_symbols(source, config);
    let total = symbols.len();
    info!(total, "validating symbols");

    let mut valid_symbols = Vec::new();
    let mut invalid_symbols = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        match validate_symbol(source, symbol, &config.criteria) {
            SymbolValidation::Valid(record) => {
                debug!(
                    symbol = %symbol,
                    progress = i + 1,
                    total,
                    days = record.data_points,
                    sector = %record.sector,
                    "valid"
                );
                valid_symbols.push(record);
            }
            SymbolValidation::Invalid(record) => {
                debug!(
                    symbol = %symbol,
                    progress = i + 1,
                    total,
                    reasons = %record.reasons.join("; "),
                    "invalid"
                );
                invalid_symbols.push(record);
            }
        }
    }

    SymbolUniverse {
        summary: UniverseSummary {
            total_tested: total,
            valid_count: valid_symbols.len(),
            invalid_count: invalid_symbols.len(),
            validation_date: validated_at,
        },
        valid_symbols,
        invalid_symbols,
    }
}

fn normalize(symbols: impl IntoIterator<Item = String>) -> impl Iterator<Item = String> {
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
