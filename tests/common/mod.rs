#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;
use stock_screener::domain::error::ScreenerError;
pub use stock_screener::domain::price_history::{PriceBar, PriceHistory};
pub use stock_screener::domain::symbol::{SymbolInfo, SymbolRecord};
use stock_screener::ports::market_data_port::MarketDataPort;

/// In-memory market data with injectable failures and a call log.
#[derive(Default)]
pub struct MockMarketData {
    pub histories: HashMap<String, PriceHistory>,
    pub infos: HashMap<String, SymbolInfo>,
    pub errors: HashMap<String, String>,
    pub indexes: HashMap<String, Vec<String>>,
    pub calls: RefCell<Vec<String>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, symbol: &str, history: PriceHistory) -> Self {
        self.histories.insert(symbol.to_string(), history);
        self
    }

    pub fn with_info(mut self, symbol: &str, info: SymbolInfo) -> Self {
        self.infos.insert(symbol.to_string(), info);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn with_index(mut self, index: &str, symbols: &[&str]) -> Self {
        self.indexes.insert(
            index.to_string(),
            symbols.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn calls_for(&self, symbol: &str) -> usize {
        self.calls.borrow().iter().filter(|s| *s == symbol).count()
    }

    fn record_call(&self, symbol: &str) -> Result<(), ScreenerError> {
        self.calls.borrow_mut().push(symbol.to_string());
        match self.errors.get(symbol) {
            Some(reason) => Err(ScreenerError::data_source(symbol, reason)),
            None => Ok(()),
        }
    }
}

impl MarketDataPort for MockMarketData {
    fn get_history(
        &self,
        symbol: &str,
        lookback_days: i64,
    ) -> Result<PriceHistory, ScreenerError> {
        self.record_call(symbol)?;
        self.histories
            .get(symbol)
            .cloned()
            .map(|h| h.trailing(lookback_days))
            .ok_or_else(|| ScreenerError::data_source(symbol, "no history"))
    }

    fn get_info(&self, symbol: &str) -> Result<SymbolInfo, ScreenerError> {
        self.record_call(symbol)?;
        Ok(self.infos.get(symbol).cloned().unwrap_or_default())
    }

    fn list_index_symbols(&self, index: &str) -> Result<Vec<String>, ScreenerError> {
        self.indexes
            .get(index)
            .cloned()
            .ok_or_else(|| ScreenerError::data_source(index, "unknown index"))
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub const STANDARD_FIELDS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

/// Consecutive daily bars ending on `end`, one per (close, volume) pair.
pub fn history_from(symbol: &str, end: NaiveDate, closes: &[f64], volumes: &[f64]) -> PriceHistory {
    let n = closes.len();
    let bars = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| PriceBar {
            date: end - Duration::days((n - 1 - i) as i64),
            close,
            volume,
        })
        .collect();
    PriceHistory::new(
        symbol,
        STANDARD_FIELDS.iter().map(|s| s.to_string()).collect(),
        bars,
    )
}

/// Closes rising linearly from `start` to `end` with constant volume.
pub fn linear_history(symbol: &str, bars: usize, start: f64, end: f64, volume: f64) -> PriceHistory {
    let step = if bars > 1 {
        (end - start) / (bars - 1) as f64
    } else {
        0.0
    };
    let closes: Vec<f64> = (0..bars)
        .map(|i| if i + 1 == bars { end } else { start + step * i as f64 })
        .collect();
    let volumes = vec![volume; bars];
    history_from(symbol, date("2024-06-03"), &closes, &volumes)
}

pub fn value_info(sector: &str, pe: Option<f64>, dividend_yield: Option<f64>) -> SymbolInfo {
    SymbolInfo {
        sector: Some(sector.to_string()),
        industry: Some("Diversified".to_string()),
        market_cap: Some(50_000_000_000),
        trailing_pe: pe,
        dividend_yield,
        ..SymbolInfo::default()
    }
}

pub fn record(symbol: &str, sector: &str) -> SymbolRecord {
    SymbolRecord {
        sector: sector.to_string(),
        market_cap: 50_000_000_000,
        current_price: 100.0,
        avg_volume: 1_000_000.0,
        data_points: 250,
        ..SymbolRecord::bare(symbol)
    }
}

pub fn names(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}
