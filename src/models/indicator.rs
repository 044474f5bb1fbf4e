//! Indicator definitions and latest-value snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PriceField;

/// Supported indicator families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    /// Moving average (simple or exponential, per `ma_type`)
    Ma,
    /// Relative Strength Index with Wilder smoothing
    Rsi,
    /// Trailing-window volume weighted average price
    Vwap,
}

/// Moving average flavor, read from the `ma_type` param of an `MA` indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaType {
    /// Simple moving average
    #[default]
    Sma,
    /// Exponential moving average
    Ema,
}

/// A named derived-series definition backing one `ind.<id>` context key.
///
/// `params` is a free-form map; `period` (integer) is required for every
/// kind and `ma_type` is consulted only for `MA`. `timeframe` and
/// `use_eod_only` are advisory metadata; evaluation assumes end-of-day
/// daily bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDef {
    /// Identifier, unique per plan and stock (referenced as `ind.<id>`)
    pub id: String,
    /// Indicator family
    #[serde(rename = "type")]
    pub kind: IndicatorKind,
    /// Free-form parameters (must contain an integer `period`)
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Which bar price the indicator reads
    #[serde(default)]
    pub price_field: PriceField,
    /// Advisory timeframe label
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// Advisory end-of-day-only flag
    #[serde(default = "default_use_eod_only")]
    pub use_eod_only: bool,
}

pub(crate) fn default_timeframe() -> String {
    "1D".to_string()
}

pub(crate) fn default_use_eod_only() -> bool {
    true
}

impl IndicatorDef {
    /// Lookback period from `params`, `0` when absent or non-numeric.
    ///
    /// Numeric strings are accepted; fractional periods truncate.
    pub fn period(&self) -> i64 {
        match self.params.get("period") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
            _ => 0,
        }
    }

    /// Moving-average flavor from `params`, defaulting to SMA.
    ///
    /// Only consulted for `MA` definitions.
    pub fn ma_type(&self) -> MaType {
        match self.params.get("ma_type").and_then(Value::as_str) {
            Some("EMA") => MaType::Ema,
            _ => MaType::Sma,
        }
    }
}

/// Status of a latest indicator value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotStatus {
    /// The latest series slot holds a value
    Ok,
    /// Not enough history to produce a value at the latest bar
    InsufficientHistory,
}

/// Latest computed value of one indicator, ready for persistence upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Indicator identifier
    pub indicator_id: String,
    /// Date of the latest bar the value belongs to
    pub as_of_date: NaiveDate,
    /// The latest series value, if history sufficed
    pub value: Option<f64>,
    /// `OK` or `INSUFFICIENT_HISTORY`
    pub status: SnapshotStatus,
    /// The period the computation used
    pub lookback_used: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def(params: Value) -> IndicatorDef {
        IndicatorDef {
            id: "x".to_string(),
            kind: IndicatorKind::Ma,
            params: params.as_object().cloned().unwrap_or_default(),
            price_field: PriceField::Close,
            timeframe: "1D".to_string(),
            use_eod_only: true,
        }
    }

    #[test]
    fn test_period_integer() {
        assert_eq!(def(json!({"period": 14})).period(), 14);
    }

    #[test]
    fn test_period_truncates_and_parses_strings() {
        assert_eq!(def(json!({"period": 14.9})).period(), 14);
        assert_eq!(def(json!({"period": "20"})).period(), 20);
    }

    #[test]
    fn test_period_defaults_to_zero() {
        assert_eq!(def(json!({})).period(), 0);
        assert_eq!(def(json!({"period": "fast"})).period(), 0);
    }

    #[test]
    fn test_ma_type() {
        assert_eq!(def(json!({})).ma_type(), MaType::Sma);
        assert_eq!(def(json!({"ma_type": "EMA"})).ma_type(), MaType::Ema);
        assert_eq!(def(json!({"ma_type": "WMA"})).ma_type(), MaType::Sma);
    }

    #[test]
    fn test_def_deserializes_plan_shape() {
        let parsed: IndicatorDef = serde_json::from_value(json!({
            "id": "rsi14",
            "type": "RSI",
            "params": {"period": 14},
            "price_field": "close"
        }))
        .unwrap();
        assert_eq!(parsed.kind, IndicatorKind::Rsi);
        assert_eq!(parsed.period(), 14);
        assert_eq!(parsed.timeframe, "1D");
        assert!(parsed.use_eod_only);
    }

    #[test]
    fn test_snapshot_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&SnapshotStatus::InsufficientHistory).unwrap(),
            "\"INSUFFICIENT_HISTORY\""
        );
    }
}
