//! Data models for bars, indicator definitions, and decisions.

mod bar;
mod decision;
mod indicator;

pub use bar::{DailyBar, PriceField};
pub use decision::{Action, Decision, PositionState, Reason, Verdict};
pub use indicator::{
    IndicatorDef, IndicatorKind, IndicatorSnapshot, MaType, SnapshotStatus,
};
