//! Technical analysis indicators for daily bar data.
//!
//! This module provides the indicator families a rule plan can declare.
//! All indicators work with oldest-first price data and return a series of
//! the same length, with `None` marking slots that lack sufficient history.
//!
//! # Available Indicators
//!
//! - [`sma`] - Simple Moving Average
//! - [`ema`] - Exponential Moving Average
//! - [`rsi`] - Relative Strength Index (Wilder smoothing)
//! - [`vwap`] - Trailing-window Volume Weighted Average Price
//!
//! # From indicator definitions
//!
//! [`indicator_series`] computes the series an [`IndicatorDef`] describes,
//! and [`latest_snapshots`] reduces each definition to its latest value with
//! an `OK` / `INSUFFICIENT_HISTORY` status for persistence upstream.
//!
//! # Example
//!
//! ```
//! use finance_rules::indicators::sma;
//!
//! let closes = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//! let sma_3 = sma(&closes, 3);
//! assert_eq!(sma_3[4], Some(4.0));
//! ```

mod ema;
mod rsi;
mod sma;
mod vwap;

pub use ema::ema;
pub use rsi::rsi;
pub use sma::sma;
pub use vwap::vwap;

use crate::models::{
    DailyBar, IndicatorDef, IndicatorKind, IndicatorSnapshot, MaType, SnapshotStatus,
};

/// Error type for indicator calculations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IndicatorError {
    /// Price and volume inputs had different lengths
    #[error("Prices and volumes length mismatch")]
    LengthMismatch,
}

/// Result type for indicator calculations
pub type Result<T> = std::result::Result<T, IndicatorError>;

/// Compute the full series an indicator definition describes.
///
/// `bars` must be ordered ascending by date; the returned series is aligned
/// to it (oldest first). `MA` reads the definition's price field and
/// `ma_type`; `RSI` reads the price field; `VWAP` pairs prices with volumes.
pub fn indicator_series(def: &IndicatorDef, bars: &[DailyBar]) -> Result<Vec<Option<f64>>> {
    let prices: Vec<f64> = bars.iter().map(|bar| bar.price(def.price_field)).collect();
    let period = def.period();

    match def.kind {
        IndicatorKind::Ma => Ok(match def.ma_type() {
            MaType::Sma => sma(&prices, period),
            MaType::Ema => ema(&prices, period),
        }),
        IndicatorKind::Rsi => Ok(rsi(&prices, period)),
        IndicatorKind::Vwap => {
            let volumes: Vec<f64> = bars.iter().map(|bar| bar.volume as f64).collect();
            vwap(&prices, &volumes, period)
        }
    }
}

/// Latest value of every indicator definition against the latest bar.
///
/// Returns an empty list when there are no bars. Each snapshot carries the
/// value (when history sufficed), its status, and the lookback the
/// computation used.
pub fn latest_snapshots(
    bars: &[DailyBar],
    defs: &[IndicatorDef],
) -> Result<Vec<IndicatorSnapshot>> {
    let Some(latest_bar) = bars.last() else {
        return Ok(Vec::new());
    };

    let mut snapshots = Vec::with_capacity(defs.len());
    for def in defs {
        let series = indicator_series(def, bars)?;
        let value = series.last().copied().flatten();
        let status = match value {
            Some(_) => SnapshotStatus::Ok,
            None => SnapshotStatus::InsufficientHistory,
        };
        snapshots.push(IndicatorSnapshot {
            indicator_id: def.id.clone(),
            as_of_date: latest_bar.date,
            value,
            status,
            lookback_used: def.period(),
        });
    }

    Ok(snapshots)
}
