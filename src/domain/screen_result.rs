//! Screen output records and runs.

use crate::domain::symbol::SymbolRecord;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionReason {
    PassedScreen,
    CustomSymbol,
}

/// Metrics computed by a rule set for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenMetrics {
    Momentum {
        three_month_return: f64,
        volume_ratio: f64,
    },
    Value {
        pe_ratio: f64,
        dividend_yield: f64,
    },
}

/// One qualifying symbol in a run. Metric keys absent from the rule set are
/// omitted when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenResult {
    pub symbol: String,
    pub sector: String,
    pub industry: String,
    pub current_price: f64,
    pub market_cap: u64,
    pub screen_date: NaiveDate,
    pub inclusion_reason: InclusionReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_month_return: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
}

impl ScreenResult {
    /// Force-included symbol: built from the validated record alone.
    pub fn custom(record: &SymbolRecord, screen_date: NaiveDate) -> Self {
        Self::base(record, screen_date, InclusionReason::CustomSymbol)
    }

    pub fn passed(record: &SymbolRecord, screen_date: NaiveDate, metrics: ScreenMetrics) -> Self {
        let mut result = Self::base(record, screen_date, InclusionReason::PassedScreen);
        match metrics {
            ScreenMetrics::Momentum {
                three_month_return,
                volume_ratio,
            } => {
                result.three_month_return = Some(three_month_return);
                result.volume_ratio = Some(volume_ratio);
            }
            ScreenMetrics::Value {
                pe_ratio,
                dividend_yield,
            } => {
                result.pe_ratio = Some(pe_ratio);
                result.dividend_yield = Some(dividend_yield);
            }
        }
        result
    }

    fn base(record: &SymbolRecord, screen_date: NaiveDate, reason: InclusionReason) -> Self {
        Self {
            symbol: record.symbol.clone(),
            sector: record.sector.clone(),
            industry: record.industry.clone(),
            current_price: record.current_price,
            market_cap: record.market_cap,
            screen_date,
            inclusion_reason: reason,
            three_month_return: None,
            volume_ratio: None,
            pe_ratio: None,
            dividend_yield: None,
        }
    }

    pub fn metrics(&self) -> Option<ScreenMetrics> {
        match (
            self.three_month_return,
            self.volume_ratio,
            self.pe_ratio,
            self.dividend_yield,
        ) {
            (Some(three_month_return), Some(volume_ratio), _, _) => Some(ScreenMetrics::Momentum {
                three_month_return,
                volume_ratio,
            }),
            (_, _, Some(pe_ratio), Some(dividend_yield)) => Some(ScreenMetrics::Value {
                pe_ratio,
                dividend_yield,
            }),
            _ => None,
        }
    }
}

/// Output of one engine invocation. Write-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenRun {
    pub screen_name: String,
    pub screen_date: NaiveDateTime,
    pub total_results: usize,
    pub results: Vec<ScreenResult>,
}

impl ScreenRun {
    pub fn new(
        screen_name: impl Into<String>,
        screen_date: NaiveDateTime,
        results: Vec<ScreenResult>,
    ) -> Self {
        Self {
            screen_name: screen_name.into(),
            screen_date,
            total_results: results.len(),
            results,
        }
    }

    pub fn symbols(&self) -> Vec<String> {
        self.results.iter().map(|r| r.symbol.clone()).collect()
    }
}
