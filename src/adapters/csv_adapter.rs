//! CSV directory market data adapter.
//!
//! Layout under the base directory:
//! - `history/{SYMBOL}.csv`: daily rows with `date`, `close` and `volume`
//!   columns (any order, case-insensitive); other columns are reported as
//!   available fields.
//! - `info/{SYMBOL}.csv`: `key,value` metadata rows.
//! - `index/{INDEX}.csv`: constituents in a `Symbol` column.

use crate::domain::error::ScreenerError;
use crate::domain::price_history::{PriceBar, PriceHistory};
use crate::domain::symbol::SymbolInfo;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvMarketDataAdapter {
    base_path: PathBuf,
}

impl CsvMarketDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn history_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join("history").join(format!("{}.csv", symbol))
    }

    fn info_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join("info").join(format!("{}.csv", symbol))
    }

    fn index_path(&self, index: &str) -> PathBuf {
        self.base_path.join("index").join(format!("{}.csv", index))
    }
}

fn read_file(symbol: &str, path: &Path) -> Result<String, ScreenerError> {
    fs::read_to_string(path).map_err(|e| {
        ScreenerError::data_source(symbol, format!("failed to read {}: {}", path.display(), e))
    })
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn parse_value(symbol: &str, record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, ScreenerError> {
    let raw = record
        .get(idx)
        .ok_or_else(|| ScreenerError::data_source(symbol, format!("missing {} column", name)))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| ScreenerError::data_source(symbol, format!("invalid {} value: {}", name, e)))?;
    if !value.is_finite() {
        return Err(ScreenerError::data_source(
            symbol,
            format!("non-finite {} value: {}", name, raw.trim()),
        ));
    }
    Ok(value)
}

impl MarketDataPort for CsvMarketDataAdapter {
    fn get_history(
        &self,
        symbol: &str,
        lookback_days: i64,
    ) -> Result<PriceHistory, ScreenerError> {
        let content = read_file(symbol, &self.history_path(symbol))?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| ScreenerError::data_source(symbol, format!("CSV parse error: {}", e)))?
            .clone();
        let missing = |name: &str| ScreenerError::data_source(symbol, format!("missing {} column", name));
        let date_idx = column(&headers, "date").ok_or_else(|| missing("date"))?;
        let close_idx = column(&headers, "close").ok_or_else(|| missing("close"))?;
        let volume_idx = column(&headers, "volume").ok_or_else(|| missing("volume"))?;

        let fields: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .map(|(_, h)| h.trim().to_string())
            .collect();

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| ScreenerError::data_source(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = record.get(date_idx).ok_or_else(|| missing("date"))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                ScreenerError::data_source(symbol, format!("invalid date format: {}", e))
            })?;

            bars.push(PriceBar {
                date,
                close: parse_value(symbol, &record, close_idx, "close")?,
                volume: parse_value(symbol, &record, volume_idx, "volume")?,
            });
        }

        let history = PriceHistory::new(symbol, fields, bars).trailing(lookback_days);
        debug!(symbol, bars = history.len(), "loaded price history");
        Ok(history)
    }

    fn get_info(&self, symbol: &str) -> Result<SymbolInfo, ScreenerError> {
        let content = read_file(symbol, &self.info_path(symbol))?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| ScreenerError::data_source(symbol, format!("CSV parse error: {}", e)))?;
            if let (Some(key), Some(value)) = (record.get(0), record.get(1)) {
                rows.push((key.to_string(), value.to_string()));
            }
        }

        Ok(SymbolInfo::from_pairs(
            rows.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }

    fn list_index_symbols(&self, index: &str) -> Result<Vec<String>, ScreenerError> {
        let content = read_file(index, &self.index_path(index))?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| ScreenerError::data_source(index, format!("CSV parse error: {}", e)))?
            .clone();
        let symbol_idx = column(&headers, "symbol")
            .ok_or_else(|| ScreenerError::data_source(index, "missing Symbol column"))?;

        let mut symbols = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| ScreenerError::data_source(index, format!("CSV parse error: {}", e)))?;
            if let Some(s) = record.get(symbol_idx) {
                let s = s.trim().to_uppercase();
                if !s.is_empty() {
                    symbols.push(s);
                }
            }
        }
        debug!(index, count = symbols.len(), "loaded index constituents");
        Ok(symbols)
    }
}
