//! Rate-limiting decorator for market data providers.

use crate::domain::error::ScreenerError;
use crate::domain::price_history::PriceHistory;
use crate::domain::symbol::SymbolInfo;
use crate::ports::market_data_port::MarketDataPort;
use std::time::Duration;

/// Sleeps a fixed delay after every fetch, whether it succeeded or not.
pub struct ThrottledMarketData<P> {
    inner: P,
    delay: Duration,
}

impl<P: MarketDataPort> ThrottledMarketData<P> {
    pub fn new(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn from_millis(inner: P, delay_ms: i64) -> Self {
        Self::new(inner, Duration::from_millis(delay_ms.max(0) as u64))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn pause<T>(&self, result: T) -> T {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        result
    }
}

impl<P: MarketDataPort> MarketDataPort for ThrottledMarketData<P> {
    fn get_history(
        &self,
        symbol: &str,
        lookback_days: i64,
    ) -> Result<PriceHistory, ScreenerError> {
        self.pause(self.inner.get_history(symbol, lookback_days))
    }

    fn get_info(&self, symbol: &str) -> Result<SymbolInfo, ScreenerError> {
        self.pause(self.inner.get_info(symbol))
    }

    fn list_index_symbols(&self, index: &str) -> Result<Vec<String>, ScreenerError> {
        self.pause(self.inner.list_index_symbols(index))
    }
}
