/// Daily bar module
///
/// Contains the end-of-day OHLCV bar structure and the price field selector.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single end-of-day OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Adjusted close (if available)
    pub adjusted_close: Option<f64>,
    /// Volume
    pub volume: i64,
}

impl DailyBar {
    /// Price for the given field, falling back to close when the bar
    /// carries no adjusted close.
    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Close => self.close,
            PriceField::AdjustedClose => self.adjusted_close.unwrap_or(self.close),
        }
    }
}

/// Which bar price an indicator reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    /// Raw close price
    #[default]
    Close,
    /// Split/dividend adjusted close, falling back to close when absent
    AdjustedClose,
}
