//! The rule expression language: lexer, parser, and evaluator.
//!
//! Expressions combine bar series, indicator series, and scalars with
//! arithmetic, comparisons, boolean logic, historical indexing, and
//! crossover tests:
//!
//! ```text
//! Close > SMA(50)
//! RSI(14) < 30 AND Volume > 1000000
//! (Close / Close[1] - 1) * 100 >= 2
//! ind.fast crossover ind.slow
//! ```
//!
//! Identifiers resolve against an [`EvalContext`](crate::EvalContext);
//! offset `0` is the latest bar and `Close[k]` reaches `k` bars back.
//! Missing values (insufficient history, unknown identifiers, out-of-range
//! reads) propagate through arithmetic and make comparisons false, while
//! division by zero, unknown functions, and indexing a non-series fail fast.
//!
//! # Example
//!
//! ```
//! use finance_rules::{EvalContext, Series};
//! use finance_rules::expr::{Value, evaluate_expression};
//!
//! let mut ctx = EvalContext::new();
//! ctx.insert_series("Close", Series::from_values(vec![110.0, 100.0]));
//!
//! let value = evaluate_expression("Close > Close[1]", &ctx).unwrap();
//! assert_eq!(value, Value::Bool(true));
//! ```

mod eval;
mod lexer;
mod parser;

pub use eval::Value;
pub use lexer::{Token, tokenize};
pub use parser::{BinaryOp, CmpOp, Expr, UnaryOp, parse_expression};

pub(crate) use eval::Evaluator;

use crate::context::EvalContext;
use crate::error::Result;

/// Parse and evaluate expression text at offset 0.
///
/// Series identifiers resolve to their latest value unless consumed by a
/// function call, an index, or a crossover operand.
pub fn evaluate_expression(text: &str, context: &EvalContext) -> Result<Value> {
    let expr = parse_expression(text)?;
    Evaluator::new(context).eval(&expr, 0, false)
}
