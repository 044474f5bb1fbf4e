//! Expression evaluator threading a bar offset through the AST.

use crate::context::{ContextValue, EvalContext};
use crate::error::{Result, RuleError};
use crate::series::Series;

use super::parser::{BinaryOp, CmpOp, Expr, UnaryOp};

/// A value produced while evaluating an expression.
///
/// Identifiers and function results may be whole series; whether a series is
/// projected to the scalar at the current offset depends on where it sits.
/// Function arguments, index receivers, and crossover operands keep the
/// series, everything else reads `value_at(offset)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value: insufficient history, unknown identifier, or an
    /// out-of-range read. Propagates through arithmetic and makes
    /// comparisons false.
    Missing,
    /// A scalar number
    Number(f64),
    /// A boolean, produced by comparisons and logical operators
    Bool(bool),
    /// A whole newest-first series
    Series(Series),
}

impl Value {
    /// Truthiness: missing is false, numbers are true when non-zero.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Missing => false,
            Self::Number(x) => *x != 0.0,
            Self::Bool(b) => *b,
            Self::Series(_) => true,
        }
    }

    /// Numeric view: booleans coerce to 1/0, missing and series do not
    /// convert.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            Self::Bool(true) => Some(1.0),
            Self::Bool(false) => Some(0.0),
            Self::Missing | Self::Series(_) => None,
        }
    }

    /// Whether this is the missing value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(x) => Self::Number(x),
            None => Self::Missing,
        }
    }
}

pub(crate) struct Evaluator<'a> {
    context: &'a EvalContext,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(context: &'a EvalContext) -> Self {
        Self { context }
    }

    /// Evaluate `expr` at the given bar offset.
    ///
    /// `preserve_series` keeps series values whole instead of projecting to
    /// the scalar at `offset`; it is set for function arguments and index
    /// receivers.
    pub(crate) fn eval(&self, expr: &Expr, offset: i64, preserve_series: bool) -> Result<Value> {
        match expr {
            Expr::Number(x) => Ok(Value::Number(*x)),
            Expr::Ident(name) => Ok(match self.context.lookup(name) {
                None => Value::Missing,
                Some(ContextValue::Scalar(x)) => Value::Number(*x),
                Some(ContextValue::Series(series)) => {
                    project_series(series, offset, preserve_series)
                }
            }),
            Expr::Call { name, args } => {
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg, offset, true)?);
                }
                let function = self
                    .context
                    .function(name)
                    .ok_or_else(|| RuleError::unknown_function(name.clone()))?;
                let result = function(&arg_values)?;
                Ok(match result {
                    Value::Series(series) => project_series(&series, offset, preserve_series),
                    other => other,
                })
            }
            Expr::Index { base, index } => {
                let receiver = self.eval(base, offset, true)?;
                let Value::Series(series) = receiver else {
                    return Err(RuleError::IndexRequiresSeries);
                };
                let position = self
                    .eval(index, offset, false)?
                    .as_number()
                    .ok_or_else(|| RuleError::operand("series index must be a number"))?
                    as i64;
                Ok(Value::from(series.value_at(position + offset)))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, offset, false)?;
                Ok(match value.as_number() {
                    None => Value::Missing,
                    Some(x) => Value::Number(match op {
                        UnaryOp::Plus => x,
                        UnaryOp::Minus => -x,
                    }),
                })
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left, offset, false)?;
                let right = self.eval(right, offset, false)?;
                apply_binary(*op, left, right)
            }
            Expr::Compare { op, left, right } => self.apply_comparison(*op, left, right, offset),
            Expr::And { left, right } => {
                if !self.eval(left, offset, false)?.truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(right, offset, false)?.truthy()))
            }
            Expr::Or { left, right } => {
                if self.eval(left, offset, false)?.truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(right, offset, false)?.truthy()))
            }
            Expr::Not { operand } => {
                Ok(Value::Bool(!self.eval(operand, offset, false)?.truthy()))
            }
        }
    }

    fn apply_comparison(&self, op: CmpOp, left: &Expr, right: &Expr, offset: i64) -> Result<Value> {
        if matches!(op, CmpOp::Crossover | CmpOp::Crossunder) {
            let left_now = self.eval(left, offset, false)?.as_number();
            let right_now = self.eval(right, offset, false)?.as_number();
            let left_prev = self.eval(left, offset + 1, false)?.as_number();
            let right_prev = self.eval(right, offset + 1, false)?.as_number();
            let (Some(ln), Some(rn), Some(lp), Some(rp)) =
                (left_now, right_now, left_prev, right_prev)
            else {
                return Ok(Value::Bool(false));
            };
            let crossed = match op {
                CmpOp::Crossover => ln > rn && lp <= rp,
                _ => ln < rn && lp >= rp,
            };
            return Ok(Value::Bool(crossed));
        }

        let left = self.eval(left, offset, false)?.as_number();
        let right = self.eval(right, offset, false)?.as_number();
        let (Some(a), Some(b)) = (left, right) else {
            return Ok(Value::Bool(false));
        };
        Ok(Value::Bool(op.scalar(a, b)))
    }
}

fn project_series(series: &Series, offset: i64, preserve_series: bool) -> Value {
    if preserve_series {
        Value::Series(series.clone())
    } else {
        Value::from(series.value_at(offset))
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    if left.is_missing() || right.is_missing() {
        return Ok(Value::Missing);
    }
    let a = left
        .as_number()
        .ok_or_else(|| RuleError::operand("arithmetic requires numeric operands"))?;
    let b = right
        .as_number()
        .ok_or_else(|| RuleError::operand("arithmetic requires numeric operands"))?;
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(RuleError::DivisionByZero);
            }
            a / b
        }
    };
    Ok(Value::Number(result))
}
