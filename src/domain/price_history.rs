//! Daily price/volume history for a single symbol.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

/// Ascending-by-date series for one symbol over a bounded trailing window.
///
/// `fields` lists the column names the provider delivered (e.g. `open`,
/// `high`), which validation checks against the configured required fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub symbol: String,
    pub fields: Vec<String>,
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn new(symbol: impl Into<String>, fields: Vec<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            fields,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_close(&self) -> Option<f64> {
        self.bars.first().map(|b| b.close)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Mean volume over the whole window, 0 when empty.
    pub fn mean_volume(&self) -> f64 {
        mean(self.bars.iter().map(|b| b.volume))
    }

    /// Case-insensitive check for a provider column.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.eq_ignore_ascii_case(field))
    }

    /// Drop bars older than `lookback_days` before the most recent bar.
    pub fn trailing(mut self, lookback_days: i64) -> Self {
        if let Some(last) = self.last_date() {
            let cutoff = last - chrono::Duration::days(lookback_days);
            self.bars.retain(|b| b.date > cutoff);
        }
        self
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
