//! Symbol metadata and validated symbol records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_CURRENCY: &str = "USD";

/// Provider metadata for a symbol. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolInfo {
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    pub market_cap: Option<u64>,
    pub trailing_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl SymbolInfo {
    /// Build from provider key/value pairs. Unknown keys are ignored, and
    /// empty, `null` or `None` values count as absent.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut info = SymbolInfo::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty()
                || value.eq_ignore_ascii_case("null")
                || value.eq_ignore_ascii_case("none")
            {
                continue;
            }
            match key.trim() {
                "longName" => info.long_name = Some(value.to_string()),
                "sector" => info.sector = Some(value.to_string()),
                "industry" => info.industry = Some(value.to_string()),
                "country" => info.country = Some(value.to_string()),
                "exchange" => info.exchange = Some(value.to_string()),
                "currency" => info.currency = Some(value.to_string()),
                "marketCap" => {
                    info.market_cap = value
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite() && *v >= 0.0)
                        .map(|v| v as u64)
                }
                "trailingPE" => info.trailing_pe = value.parse().ok().filter(|v: &f64| v.is_finite()),
                "dividendYield" => {
                    info.dividend_yield = value.parse().ok().filter(|v: &f64| v.is_finite())
                }
                _ => {}
            }
        }
        info
    }
}

/// A symbol that passed validation. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub market_cap: u64,
    pub avg_volume: f64,
    pub current_price: f64,
    pub data_points: usize,
    pub data_start: Option<NaiveDate>,
    pub data_end: Option<NaiveDate>,
    #[serde(default = "unknown")]
    pub sector: String,
    #[serde(default = "unknown")]
    pub industry: String,
    #[serde(default = "unknown")]
    pub country: String,
    #[serde(default = "unknown")]
    pub exchange: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl SymbolRecord {
    /// A record carrying only a symbol and default metadata.
    pub fn bare(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            market_cap: 0,
            avg_volume: 0.0,
            current_price: 0.0,
            data_points: 0,
            data_start: None,
            data_end: None,
            sector: unknown(),
            industry: unknown(),
            country: unknown(),
            exchange: unknown(),
            currency: default_currency(),
        }
    }

    pub fn with_metadata(mut self, info: &SymbolInfo) -> Self {
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(unknown);
        self.name = info.long_name.clone();
        self.sector = or_unknown(&info.sector);
        self.industry = or_unknown(&info.industry);
        self.country = or_unknown(&info.country);
        self.exchange = or_unknown(&info.exchange);
        self.currency = info.currency.clone().unwrap_or_else(default_currency);
        self
    }
}

/// A symbol that failed one or more validation checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidRecord {
    pub symbol: String,
    pub reasons: Vec<String>,
    #[serde(default)]
    pub data_points: usize,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}
