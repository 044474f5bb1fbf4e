//! Evaluation context: identifier and function tables built from bars.
//!
//! Identifier reads and function calls are distinct lookups with distinct
//! types: identifiers map to scalars or series, functions map to callables
//! that take already-evaluated values.

use std::collections::HashMap;

use crate::error::{Result, RuleError};
use crate::expr::Value;
use crate::indicators::{self, indicator_series};
use crate::models::{DailyBar, IndicatorDef};
use crate::series::Series;

/// A value an identifier can resolve to
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    /// A plain scalar
    Scalar(f64),
    /// A newest-first series
    Series(Series),
}

/// A callable installed in the function table
pub type ContextFunction = Box<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Identifier and function tables for one evaluation.
///
/// The standard context exposes the bar series under `Close`, `Open`,
/// `High`, `Low`, `Volume` and their `price.*` / `volume` aliases, one
/// `ind.<id>` series per indicator definition, and the standard function
/// set (`SMA`, `EMA`, `RSI`, `VWAP`, `highest`, `lowest`, `change`,
/// `diff`). When a live price is supplied it overlays offset 0 of `Close`
/// and `price.close` only.
#[derive(Default)]
pub struct EvalContext {
    identifiers: HashMap<String, ContextValue>,
    functions: HashMap<String, ContextFunction>,
}

impl EvalContext {
    /// Empty context with no identifiers or functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard context from daily bars.
    ///
    /// `bars` may arrive in any order and are sorted by date; the resulting
    /// series are newest-first. Fails when `bars` is empty or an indicator
    /// definition cannot be computed.
    pub fn from_bars(
        bars: &[DailyBar],
        defs: &[IndicatorDef],
        current_price: Option<f64>,
    ) -> Result<Self> {
        if bars.is_empty() {
            return Err(RuleError::NoBars);
        }
        let mut sorted = bars.to_vec();
        sorted.sort_by_key(|bar| bar.date);

        let mut closes: Vec<Option<f64>> = sorted.iter().rev().map(|b| Some(b.close)).collect();
        if let Some(price) = current_price {
            closes[0] = Some(price);
        }
        let close = Series::new(closes);
        let adjusted_close = Series::new(
            sorted
                .iter()
                .rev()
                .map(|b| Some(b.adjusted_close.unwrap_or(b.close)))
                .collect(),
        );
        let open = Series::new(sorted.iter().rev().map(|b| Some(b.open)).collect());
        let high = Series::new(sorted.iter().rev().map(|b| Some(b.high)).collect());
        let low = Series::new(sorted.iter().rev().map(|b| Some(b.low)).collect());
        let volume = Series::new(sorted.iter().rev().map(|b| Some(b.volume as f64)).collect());

        let mut ctx = Self::new();
        ctx.insert_series("Close", close.clone());
        ctx.insert_series("Open", open.clone());
        ctx.insert_series("High", high.clone());
        ctx.insert_series("Low", low.clone());
        ctx.insert_series("Volume", volume.clone());
        ctx.insert_series("price.close", close);
        ctx.insert_series("price.adjusted_close", adjusted_close);
        ctx.insert_series("price.open", open);
        ctx.insert_series("price.high", high);
        ctx.insert_series("price.low", low);
        ctx.insert_series("volume", volume);

        for def in defs {
            let series = indicator_series(def, &sorted)?;
            ctx.insert_series(format!("ind.{}", def.id), Series::from_ascending(series));
        }

        ctx.install_standard_functions(&sorted);
        Ok(ctx)
    }

    /// Install a scalar identifier.
    pub fn insert_scalar(&mut self, name: impl Into<String>, value: f64) {
        self.identifiers
            .insert(name.into(), ContextValue::Scalar(value));
    }

    /// Install a series identifier.
    pub fn insert_series(&mut self, name: impl Into<String>, series: Series) {
        self.identifiers
            .insert(name.into(), ContextValue::Series(series));
    }

    /// Install a function.
    pub fn insert_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Box::new(function));
    }

    /// Look up an identifier.
    pub fn lookup(&self, name: &str) -> Option<&ContextValue> {
        self.identifiers.get(name)
    }

    /// Look up a function.
    pub fn function(&self, name: &str) -> Option<&ContextFunction> {
        self.functions.get(name)
    }

    /// Identifier names currently installed, for diagnostics.
    pub fn identifier_names(&self) -> impl Iterator<Item = &str> {
        self.identifiers.keys().map(String::as_str)
    }

    fn install_standard_functions(&mut self, sorted: &[DailyBar]) {
        let closes: Vec<f64> = sorted.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = sorted.iter().map(|b| b.volume as f64).collect();

        {
            let closes = closes.clone();
            self.insert_function("SMA", move |args| {
                let period = period_arg("SMA", args)?;
                Ok(Value::Series(Series::from_ascending(indicators::sma(
                    &closes, period,
                ))))
            });
        }
        {
            let closes = closes.clone();
            self.insert_function("EMA", move |args| {
                let period = period_arg("EMA", args)?;
                Ok(Value::Series(Series::from_ascending(indicators::ema(
                    &closes, period,
                ))))
            });
        }
        {
            let closes = closes.clone();
            self.insert_function("RSI", move |args| {
                let period = period_arg("RSI", args)?;
                Ok(Value::Series(Series::from_ascending(indicators::rsi(
                    &closes, period,
                ))))
            });
        }
        self.insert_function("VWAP", move |args| {
            let period = period_arg("VWAP", args)?;
            let series = indicators::vwap(&closes, &volumes, period)?;
            Ok(Value::Series(Series::from_ascending(series)))
        });

        self.insert_function("highest", |args| {
            let (series, count) = series_window_args("highest", args)?;
            Ok(Value::from(window_extreme(series, count, f64::max)))
        });
        self.insert_function("lowest", |args| {
            let (series, count) = series_window_args("lowest", args)?;
            Ok(Value::from(window_extreme(series, count, f64::min)))
        });

        self.insert_function("change", |args| {
            let [value] = args else {
                return Err(RuleError::operand("change expects 1 argument"));
            };
            let Value::Series(series) = value else {
                return Ok(Value::Missing);
            };
            match (series.value_at(0), series.value_at(1)) {
                (Some(current), Some(previous)) => Ok(Value::Number(current - previous)),
                _ => Ok(Value::Missing),
            }
        });

        self.insert_function("diff", |args| {
            let [a, b] = args else {
                return Err(RuleError::operand("diff expects 2 arguments"));
            };
            match (resolve_latest(a), resolve_latest(b)) {
                (Some(a), Some(b)) => Ok(Value::Number(a - b)),
                _ => Ok(Value::Missing),
            }
        });
    }
}

/// Scalar view of a value, reading series at offset 0.
fn resolve_latest(value: &Value) -> Option<f64> {
    match value {
        Value::Series(series) => series.value_at(0),
        other => other.as_number(),
    }
}

fn period_arg(name: &str, args: &[Value]) -> Result<i64> {
    let [value] = args else {
        return Err(RuleError::operand(format!("{name} expects 1 argument")));
    };
    let period = value
        .as_number()
        .ok_or_else(|| RuleError::operand(format!("{name} period must be a number")))?;
    Ok(period as i64)
}

fn series_window_args<'a>(name: &str, args: &'a [Value]) -> Result<(&'a Series, i64)> {
    let [series, count] = args else {
        return Err(RuleError::operand(format!("{name} expects 2 arguments")));
    };
    let Value::Series(series) = series else {
        return Err(RuleError::operand(format!(
            "{name} expects a series as its first argument"
        )));
    };
    let count = count
        .as_number()
        .ok_or_else(|| RuleError::operand(format!("{name} count must be a number")))?;
    Ok((series, count as i64))
}

/// Extreme of the newest `count` slots, skipping missing values.
///
/// A negative count trims from the oldest end, mirroring slice semantics of
/// the rule language.
fn window_extreme(series: &Series, count: i64, pick: fn(f64, f64) -> f64) -> Option<f64> {
    let len = series.len() as i64;
    let end = count.clamp(-len, len);
    let end = if end < 0 { len + end } else { end } as usize;
    series.values()[..end]
        .iter()
        .flatten()
        .copied()
        .reduce(pick)
}
