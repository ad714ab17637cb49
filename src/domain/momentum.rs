//! Momentum metrics over a daily price history.
//!
//! three_month_return = (C[n-1] - C[n-63]) / C[n-63]   when n >= 63
//!                    = (C[n-1] - C[0]) / C[0]         otherwise
//! volume_ratio = mean(V[n-5..n]) / mean(V[0..n-10])   when n >= 20, else 1.0
//! A zero denominator in volume_ratio yields the neutral 1.0.

use crate::domain::error::ScreenerError;
use crate::domain::price_history::{PriceHistory, mean};

pub const MIN_MOMENTUM_BARS: usize = 60;
pub const THREE_MONTH_BARS: usize = 63;
pub const MIN_VOLUME_RATIO_BARS: usize = 20;
const RECENT_VOLUME_BARS: usize = 5;
const EXCLUDED_RECENT_BARS: usize = 10;

/// Return over the trailing 63 bars, or over the whole window on shorter
/// histories. Fails when the base close is zero.
pub fn three_month_return(history: &PriceHistory) -> Result<f64, ScreenerError> {
    let n = history.len();
    let last = history.last_close().ok_or_else(|| ScreenerError::InsufficientData {
        symbol: history.symbol.clone(),
        bars: 0,
        minimum: 1,
    })?;
    let base = if n >= THREE_MONTH_BARS {
        history.bars[n - THREE_MONTH_BARS].close
    } else {
        history.bars[0].close
    };
    if base == 0.0 {
        return Err(ScreenerError::MissingMetric {
            symbol: history.symbol.clone(),
            metric: "three_month_return (zero base close)".into(),
        });
    }
    Ok((last - base) / base)
}

pub fn volume_ratio(history: &PriceHistory) -> f64 {
    let n = history.len();
    if n < MIN_VOLUME_RATIO_BARS {
        return 1.0;
    }
    let recent = mean(history.bars[n - RECENT_VOLUME_BARS..].iter().map(|b| b.volume));
    let longer = mean(history.bars[..n - EXCLUDED_RECENT_BARS].iter().map(|b| b.volume));
    if longer == 0.0 { 1.0 } else { recent / longer }
}
