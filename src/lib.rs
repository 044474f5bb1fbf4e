//! # finance-rules
//!
//! A Rust library for evaluating stock-monitoring rule plans.
//!
//! A rule plan pairs indicator declarations with entry and exit rules.
//! Given a stock's daily bars, the backing indicator definitions, and the
//! current position state, the evaluator computes indicator series, resolves
//! the plan's expressions and structured conditions against them, and
//! produces a buy/sell decision with deterministic reasons and a stable
//! state key for change detection.
//!
//! ## Features
//!
//! - SMA, EMA, RSI, and VWAP series with explicit missing-value handling
//! - A small expression language with arithmetic, comparisons, boolean
//!   logic, historical indexing (`Close[1]`), and crossover tests
//! - Structured JSON conditions (`all`/`any`/`not` and six comparison ops)
//! - Priority-ordered entry rules with eligibility constraints, OR-joined
//!   exit conditions
//! - Deterministic state keys (SHA-256 / base32) for persisted decisions
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use finance_rules::{DailyBar, PositionState, RulePlan, evaluate_with_bars};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let plan = RulePlan::from_json(
//!         r#"{
//!             "ticker": "AAPL",
//!             "indicators": [{"id": "sma3", "type": "MA", "period": 3}],
//!             "entry_rules": [
//!                 {"id": "E1", "priority": 10, "condition_expr": "Close > ind.sma3"}
//!             ],
//!             "exit_rules": {"conditions": [
//!                 {"id": "X1", "condition_expr": "Close crossunder ind.sma3"}
//!             ]}
//!         }"#,
//!     )?;
//!
//!     let bars: Vec<DailyBar> = (0..5)
//!         .map(|i| DailyBar {
//!             date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Days::new(i),
//!             open: 100.0 + i as f64,
//!             high: 101.0 + i as f64,
//!             low: 99.0 + i as f64,
//!             close: 100.0 + i as f64,
//!             adjusted_close: None,
//!             volume: 1_000_000,
//!         })
//!         .collect();
//!
//!     let indicators = plan.indicator_defs()?;
//!     let decision = evaluate_with_bars(&plan, &bars, &indicators, PositionState::Flat, None)?;
//!
//!     assert_eq!(decision.action.as_str(), "BUY");
//!     assert!(decision.state_key.starts_with("ALLOW_BUY_E1_"));
//!     Ok(())
//! }
//! ```
//!
//! ## Determinism
//!
//! Evaluation is pure: identical inputs always produce the identical
//! decision and state key, so callers can persist `state_key` per stock and
//! notify only when it changes. Context key names, operator names, reason
//! codes, and the state-key algorithm are part of the stable contract.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Evaluation context: identifier and function tables built from bars
pub mod context;
/// Rule plan evaluation and the decision procedure
pub mod engine;
/// Error types and result definitions
pub mod error;
/// The expression language: lexer, parser, and evaluator
pub mod expr;
/// Technical indicator computations
pub mod indicators;
/// Shared TTL cache for live intraday prices
pub mod live_price;
/// Data models for bars, indicators, and decisions
pub mod models;
/// Rule plan documents and structured conditions
pub mod plan;
/// Newest-first value series with explicit missing slots
pub mod series;
/// Deterministic decision fingerprints
pub mod state_key;

// Re-export main types
pub use context::{ContextFunction, ContextValue, EvalContext};
pub use engine::{evaluate_rule_plan, evaluate_with_bars};
pub use error::{ErrorCategory, Result, RuleError};
pub use live_price::PriceCache;
pub use models::{
    Action, DailyBar, Decision, IndicatorDef, IndicatorKind, IndicatorSnapshot, MaType,
    PositionState, PriceField, Reason, SnapshotStatus, Verdict,
};
pub use plan::{Condition, EntryRule, ExitCondition, ExitRules, IndicatorPolicy, RulePlan};
pub use series::Series;

// Re-export the expression entry points for convenience
pub use expr::{evaluate_expression, parse_expression};
