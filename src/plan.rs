//! Rule plan documents: serde model, structured conditions, validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::context::{ContextValue, EvalContext};
use crate::error::{Result, RuleError};
use crate::models::{IndicatorDef, IndicatorKind, PriceField};

/// Default inheritance for the plan's indicator definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPolicy {
    /// Advisory timeframe label, `1D` by default
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// Which bar price indicators read
    #[serde(default)]
    pub price_field: PriceField,
    /// Advisory end-of-day-only flag
    #[serde(default = "default_use_eod_only")]
    pub use_eod_only: bool,
}

fn default_timeframe() -> String {
    "1D".to_string()
}

fn default_use_eod_only() -> bool {
    true
}

impl Default for IndicatorPolicy {
    fn default() -> Self {
        Self {
            timeframe: default_timeframe(),
            price_field: PriceField::default(),
            use_eod_only: true,
        }
    }
}

/// A structured condition, the declarative alternative to expression strings.
///
/// Composites nest arbitrarily; atoms compare two context names. The
/// crossing operators (`crosses_above`, `crossover`, `crosses_below`,
/// `crossunder`) are accepted but always evaluate false; crossovers require
/// the expression form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Every child must hold
    All {
        /// Conjoined children
        all: Vec<Condition>,
    },
    /// At least one child must hold
    Any {
        /// Disjoined children
        any: Vec<Condition>,
    },
    /// Child must not hold
    Not {
        /// Negated child
        not: Box<Condition>,
    },
    /// Compare two context values
    Atom {
        /// Operator: `gt`, `gte`, `lt`, `lte`, `eq`, `ne`, or a crossing op
        op: String,
        /// Context name of the left side
        left: String,
        /// Context name of the right side
        right: String,
    },
}

impl Condition {
    /// Evaluate against a context.
    ///
    /// Series resolve to their latest value; a missing side makes an atom
    /// false. Operators outside the supported set are fatal.
    pub fn evaluate(&self, context: &EvalContext) -> Result<bool> {
        match self {
            Self::All { all } => {
                for condition in all {
                    if !condition.evaluate(context)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Any { any } => {
                for condition in any {
                    if condition.evaluate(context)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not { not } => Ok(!not.evaluate(context)?),
            Self::Atom { op, left, right } => {
                let left = resolve_name(context, left);
                let right = resolve_name(context, right);
                let (Some(a), Some(b)) = (left, right) else {
                    return Ok(false);
                };
                match op.as_str() {
                    "gt" => Ok(a > b),
                    "gte" => Ok(a >= b),
                    "lt" => Ok(a < b),
                    "lte" => Ok(a <= b),
                    "eq" => Ok(a == b),
                    "ne" => Ok(a != b),
                    // structured crossings never fire; use the expression form
                    "crosses_above" | "crossover" | "crosses_below" | "crossunder" => Ok(false),
                    other => Err(RuleError::unsupported_operator(other)),
                }
            }
        }
    }

    fn atom_ops(&self) -> Vec<&str> {
        match self {
            Self::All { all } => all.iter().flat_map(Self::atom_ops).collect(),
            Self::Any { any } => any.iter().flat_map(Self::atom_ops).collect(),
            Self::Not { not } => not.atom_ops(),
            Self::Atom { op, .. } => vec![op.as_str()],
        }
    }
}

fn resolve_name(context: &EvalContext, name: &str) -> Option<f64> {
    match context.lookup(name)? {
        ContextValue::Scalar(x) => Some(*x),
        ContextValue::Series(series) => series.value_at(0),
    }
}

const CONDITION_OPS: [&str; 10] = [
    "gt",
    "gte",
    "lt",
    "lte",
    "eq",
    "ne",
    "crosses_above",
    "crossover",
    "crosses_below",
    "crossunder",
];

/// One entry rule: eligibility constraints plus a firing condition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntryRule {
    /// Rule identifier, surfaced in reasons and the state key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Lower wins; missing sorts last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Structured eligibility constraints, all must hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Condition>,
    /// Expression eligibility constraints, each must be truthy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints_expr: Vec<String>,
    /// Structured firing condition, consulted when `condition_expr` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Expression firing condition, takes precedence when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_expr: Option<String>,
}

impl EntryRule {
    /// Expression condition, treating the empty string as absent.
    pub fn condition_expr(&self) -> Option<&str> {
        self.condition_expr.as_deref().filter(|s| !s.is_empty())
    }
}

/// One exit condition; any firing condition triggers a sell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExitCondition {
    /// Condition identifier, surfaced in reasons and the state key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Structured condition, consulted when `condition_expr` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Expression condition, takes precedence when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_expr: Option<String>,
}

impl ExitCondition {
    /// Expression condition, treating the empty string as absent.
    pub fn condition_expr(&self) -> Option<&str> {
        self.condition_expr.as_deref().filter(|s| !s.is_empty())
    }
}

/// Exit rules: conditions joined by OR
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExitRules {
    /// Conditions checked in document order
    #[serde(default)]
    pub conditions: Vec<ExitCondition>,
}

/// A parsed rule plan document.
///
/// Indicator descriptors stay free-form maps (`id` and `type` plus arbitrary
/// params) until [`RulePlan::indicator_defs`] materializes them with the
/// plan's policy defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulePlan {
    /// Ticker the plan belongs to
    #[serde(default)]
    pub ticker: String,
    /// Defaults inherited by every indicator definition
    #[serde(default)]
    pub indicator_policy: IndicatorPolicy,
    /// Free-form indicator descriptors
    #[serde(default)]
    pub indicators: Vec<Map<String, JsonValue>>,
    /// Entry rules, priority-ordered at evaluation time
    #[serde(default)]
    pub entry_rules: Vec<EntryRule>,
    /// Exit rules
    #[serde(default)]
    pub exit_rules: ExitRules,
}

impl RulePlan {
    /// Parse a plan from an already-deserialized JSON value.
    pub fn from_value(value: JsonValue) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| RuleError::plan(e.to_string()))
    }

    /// Parse a plan from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| RuleError::plan(e.to_string()))
    }

    /// Materialize the plan's indicator descriptors into definitions.
    ///
    /// `id` and `type` are pulled out of each descriptor, every remaining
    /// key becomes a param, and the policy supplies the price field,
    /// timeframe, and end-of-day flag. Descriptors without an id or type
    /// are skipped; an unknown type is fatal.
    pub fn indicator_defs(&self) -> Result<Vec<IndicatorDef>> {
        let mut defs = Vec::with_capacity(self.indicators.len());
        for descriptor in &self.indicators {
            let mut params = descriptor.clone();
            let id = take_string(&mut params, "id");
            let kind = take_string(&mut params, "type");
            let (Some(id), Some(kind)) = (id, kind) else {
                continue;
            };
            let kind = parse_kind(&kind)?;
            defs.push(IndicatorDef {
                id,
                kind,
                params,
                price_field: self.indicator_policy.price_field,
                timeframe: self.indicator_policy.timeframe.clone(),
                use_eod_only: self.indicator_policy.use_eod_only,
            });
        }
        Ok(defs)
    }

    /// Check the document shape beyond what deserialization enforces.
    ///
    /// Returns a list of `path: message` problems, empty when the plan is
    /// acceptable. Callers typically map a non-empty list to a validation
    /// response and refuse to evaluate.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.ticker.is_empty() {
            problems.push("ticker: must be a non-empty string".to_string());
        }

        for (i, descriptor) in self.indicators.iter().enumerate() {
            let id = descriptor.get("id").and_then(JsonValue::as_str);
            if id.is_none_or(str::is_empty) {
                problems.push(format!("indicators.{i}.id: must be a non-empty string"));
            }
            match descriptor.get("type").and_then(JsonValue::as_str) {
                None => problems.push(format!("indicators.{i}.type: is required")),
                Some(kind) if parse_kind(kind).is_err() => {
                    problems.push(format!("indicators.{i}.type: unsupported type {kind}"));
                }
                Some(_) => {}
            }
            let period = descriptor.get("period").and_then(JsonValue::as_i64);
            if !period.is_some_and(|p| p > 0) {
                problems.push(format!("indicators.{i}.period: must be a positive integer"));
            }
        }

        for (i, rule) in self.entry_rules.iter().enumerate() {
            if rule.id.as_deref().is_none_or(str::is_empty) {
                problems.push(format!("entry_rules.{i}.id: must be a non-empty string"));
            }
            if rule.condition_expr().is_none() && rule.condition.is_none() {
                problems.push(format!(
                    "entry_rules.{i}: requires condition or condition_expr"
                ));
            }
            for condition in rule.constraints.iter().chain(rule.condition.iter()) {
                report_unknown_ops(condition, &format!("entry_rules.{i}"), &mut problems);
            }
        }

        for (i, rule) in self.exit_rules.conditions.iter().enumerate() {
            if rule.id.as_deref().is_none_or(str::is_empty) {
                problems.push(format!(
                    "exit_rules.conditions.{i}.id: must be a non-empty string"
                ));
            }
            if rule.condition_expr().is_none() && rule.condition.is_none() {
                problems.push(format!(
                    "exit_rules.conditions.{i}: requires condition or condition_expr"
                ));
            }
            if let Some(condition) = &rule.condition {
                report_unknown_ops(condition, &format!("exit_rules.conditions.{i}"), &mut problems);
            }
        }

        problems
    }
}

fn report_unknown_ops(condition: &Condition, path: &str, problems: &mut Vec<String>) {
    for op in condition.atom_ops() {
        if !CONDITION_OPS.contains(&op) {
            problems.push(format!("{path}: unsupported condition operator {op}"));
        }
    }
}

fn take_string(map: &mut Map<String, JsonValue>, key: &str) -> Option<String> {
    let value = map.remove(key)?;
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn parse_kind(kind: &str) -> Result<IndicatorKind> {
    match kind {
        "MA" => Ok(IndicatorKind::Ma),
        "RSI" => Ok(IndicatorKind::Rsi),
        "VWAP" => Ok(IndicatorKind::Vwap),
        other => Err(RuleError::plan(format!(
            "Unsupported indicator type: {other}"
        ))),
    }
}
