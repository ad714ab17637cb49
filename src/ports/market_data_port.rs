//! Market data access port trait.

use crate::domain::error::ScreenerError;
use crate::domain::price_history::PriceHistory;
use crate::domain::symbol::SymbolInfo;

/// Opaque market data provider. Any call may fail; callers treat failure as
/// an expected, per-symbol outcome.
pub trait MarketDataPort {
    /// Daily history covering at most `lookback_days` back from the most
    /// recent bar, ascending by date.
    fn get_history(&self, symbol: &str, lookback_days: i64)
    -> Result<PriceHistory, ScreenerError>;

    fn get_info(&self, symbol: &str) -> Result<SymbolInfo, ScreenerError>;

    /// Constituents of an external index list (e.g. `sp500`).
    fn list_index_symbols(&self, index: &str) -> Result<Vec<String>, ScreenerError>;
}

impl<P: MarketDataPort + ?Sized> MarketDataPort for &P {
    fn get_history(
        &self,
        symbol: &str,
        lookback_days: i64,
    ) -> Result<PriceHistory, ScreenerError> {
        (**self).get_history(symbol, lookback_days)
    }

    fn get_info(&self, symbol: &str) -> Result<SymbolInfo, ScreenerError> {
        (**self).get_info(symbol)
    }

    fn list_index_symbols(&self, index: &str) -> Result<Vec<String>, ScreenerError> {
        (**self).list_index_symbols(index)
    }
}
