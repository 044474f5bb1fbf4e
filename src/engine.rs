//! Rule plan evaluation: the decision procedure over a built context.

use tracing::{debug, trace};

use crate::context::EvalContext;
use crate::error::Result;
use crate::expr::evaluate_expression;
use crate::models::{Action, DailyBar, Decision, IndicatorDef, PositionState, Reason, Verdict};
use crate::plan::{EntryRule, RulePlan};
use crate::state_key::build_state_key;

/// Priority assigned to entry rules that carry none; sorts after any
/// explicit priority a plan realistically uses.
const DEFAULT_PRIORITY: i64 = 999_999;

/// Evaluate a rule plan against an already-built context.
///
/// With a `flat` position the entry rules are walked: a rule is eligible
/// when all of its structured constraints and constraint expressions hold,
/// and fires when its condition does. The firing rule with the lowest
/// priority wins and produces `ALLOW`/`BUY`. With a `holding` position the
/// exit conditions are OR-ed; any firing condition produces `ALLOW`/`SELL`
/// with the first triggered id as the reason source. When nothing fires the
/// decision is `BLOCK`/`NONE`.
pub fn evaluate_rule_plan(
    plan: &RulePlan,
    context: &EvalContext,
    position_state: PositionState,
) -> Result<Decision> {
    match position_state {
        PositionState::Flat => evaluate_entry(plan, context),
        PositionState::Holding => evaluate_exit(plan, context),
    }
}

/// Build the standard context from bars and evaluate in one call.
///
/// `bars` must be daily bars (any order; they are sorted by date) and
/// `indicators` the definitions backing the plan's `ind.<id>` references.
/// A supplied `current_price` overlays the latest close for the duration of
/// the evaluation.
pub fn evaluate_with_bars(
    plan: &RulePlan,
    bars: &[DailyBar],
    indicators: &[IndicatorDef],
    position_state: PositionState,
    current_price: Option<f64>,
) -> Result<Decision> {
    debug!(
        ticker = %plan.ticker,
        bars = bars.len(),
        indicators = indicators.len(),
        ?position_state,
        live_price = current_price.is_some(),
        "evaluating rule plan"
    );
    let context = EvalContext::from_bars(bars, indicators, current_price)?;
    evaluate_rule_plan(plan, &context, position_state)
}

fn evaluate_entry(plan: &RulePlan, context: &EvalContext) -> Result<Decision> {
    let mut matching: Vec<&EntryRule> = Vec::new();

    for rule in &plan.entry_rules {
        let mut constraints_ok = true;
        for constraint in &rule.constraints {
            if !constraint.evaluate(context)? {
                constraints_ok = false;
                break;
            }
        }
        for expr in &rule.constraints_expr {
            if !evaluate_expression(expr, context)?.truthy() {
                constraints_ok = false;
                break;
            }
        }

        let fired = match rule.condition_expr() {
            Some(expr) => constraints_ok && evaluate_expression(expr, context)?.truthy(),
            None => match &rule.condition {
                Some(condition) => constraints_ok && condition.evaluate(context)?,
                None => false,
            },
        };
        if fired {
            trace!(rule = rule.id.as_deref().unwrap_or("ENTRY"), "entry rule fired");
            matching.push(rule);
        }
    }

    if !matching.is_empty() {
        matching.sort_by_key(|rule| rule.priority.unwrap_or(DEFAULT_PRIORITY));
        let chosen = matching[0];
        let triggered = vec![chosen.id.clone().unwrap_or_else(|| "ENTRY".to_string())];
        let reasons = vec![Reason::with_source(
            "ENTRY_TRIGGERED",
            chosen.id.clone().unwrap_or_default(),
        )];
        return Ok(decision(Verdict::Allow, Action::Buy, triggered, reasons));
    }

    Ok(decision(
        Verdict::Block,
        Action::None,
        Vec::new(),
        vec![Reason::new("ENTRY_CONDITION_NOT_MET")],
    ))
}

fn evaluate_exit(plan: &RulePlan, context: &EvalContext) -> Result<Decision> {
    let mut triggered: Vec<String> = Vec::new();

    for rule in &plan.exit_rules.conditions {
        let fired = match rule.condition_expr() {
            Some(expr) => evaluate_expression(expr, context)?.truthy(),
            None => match &rule.condition {
                Some(condition) => condition.evaluate(context)?,
                None => false,
            },
        };
        if fired {
            let id = rule.id.clone().unwrap_or_else(|| "EXIT".to_string());
            trace!(rule = %id, "exit condition fired");
            triggered.push(id);
        }
    }

    if let Some(first) = triggered.first() {
        let reasons = vec![Reason::with_source("EXIT_TRIGGERED", first.clone())];
        return Ok(decision(Verdict::Allow, Action::Sell, triggered, reasons));
    }

    Ok(decision(
        Verdict::Block,
        Action::None,
        Vec::new(),
        vec![Reason::new("EXIT_CONDITION_NOT_MET")],
    ))
}

fn decision(
    verdict: Verdict,
    action: Action,
    triggered: Vec<String>,
    reasons: Vec<Reason>,
) -> Decision {
    let state_key = build_state_key(verdict, action, &triggered, &reasons);
    Decision {
        decision: verdict,
        action,
        state_key,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn bars(closes: &[f64]) -> Vec<DailyBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyBar {
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() + chrono::Days::new(i as u64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adjusted_close: None,
                volume: 10_000,
            })
            .collect()
    }

    fn plan(value: serde_json::Value) -> RulePlan {
        RulePlan::from_value(value).unwrap()
    }

    #[test]
    fn test_entry_rule_fires() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{"id": "E1", "priority": 10, "condition_expr": "Close > 0"}]
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0, 11.0]), &[], PositionState::Flat, None)
                .unwrap();

        assert_eq!(result.decision, Verdict::Allow);
        assert_eq!(result.action, Action::Buy);
        assert_eq!(
            result.reasons,
            vec![Reason::with_source("ENTRY_TRIGGERED", "E1")]
        );
        assert_eq!(result.state_key, "ALLOW_BUY_E1_EA23XMW5");
    }

    #[test]
    fn test_entry_not_met() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{"id": "E1", "condition_expr": "Close < 0"}]
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Flat, None).unwrap();

        assert_eq!(result.decision, Verdict::Block);
        assert_eq!(result.action, Action::None);
        assert_eq!(result.reasons, vec![Reason::new("ENTRY_CONDITION_NOT_MET")]);
        assert_eq!(result.state_key, "BLOCK_NONE_NONE_QK55OQEO");
    }

    #[test]
    fn test_entry_priority_lowest_wins() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [
                {"id": "LATER", "priority": 20, "condition_expr": "Close > 0"},
                {"id": "FIRST", "priority": 5, "condition_expr": "Close > 0"},
                {"id": "NONE_SET", "condition_expr": "Close > 0"}
            ]
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Flat, None).unwrap();

        assert_eq!(
            result.reasons,
            vec![Reason::with_source("ENTRY_TRIGGERED", "FIRST")]
        );
    }

    #[test]
    fn test_entry_constraints_gate_the_condition() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{
                "id": "E1",
                "constraints_expr": ["Close > 100"],
                "condition_expr": "Close > 0"
            }]
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Flat, None).unwrap();
        assert_eq!(result.decision, Verdict::Block);
    }

    #[test]
    fn test_entry_failed_constraint_skips_fatal_condition() {
        // the division by zero in the condition is never reached
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{
                "id": "E1",
                "constraints_expr": ["Close > 100"],
                "condition_expr": "1 / 0 > 0"
            }]
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Flat, None).unwrap();
        assert_eq!(result.decision, Verdict::Block);
    }

    #[test]
    fn test_entry_structured_constraint_and_condition() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{
                "id": "E1",
                "constraints": [{"op": "gt", "left": "Close", "right": "Open"}],
                "condition": {"op": "gt", "left": "Close", "right": "Low"}
            }]
        }));
        let mut input = bars(&[10.0]);
        input[0].open = 9.0;
        let result = evaluate_with_bars(&plan, &input, &[], PositionState::Flat, None).unwrap();
        assert_eq!(result.decision, Verdict::Allow);
    }

    #[test]
    fn test_entry_rule_without_id_uses_fallbacks() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{"condition_expr": "Close > 0"}]
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Flat, None).unwrap();

        // triggered id falls back to ENTRY, the reason source to ""
        assert_eq!(
            result.reasons,
            vec![Reason::with_source("ENTRY_TRIGGERED", "")]
        );
        assert_eq!(result.state_key, "ALLOW_BUY_ENTRY_U5YNLG6C");
    }

    #[test]
    fn test_exit_accumulates_and_reports_first() {
        let plan = plan(json!({
            "ticker": "T",
            "exit_rules": {"conditions": [
                {"id": "X2", "condition_expr": "Close > 0"},
                {"id": "X1", "condition_expr": "Close > 1"}
            ]}
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Holding, None).unwrap();

        assert_eq!(result.decision, Verdict::Allow);
        assert_eq!(result.action, Action::Sell);
        // document order decides the reason source, the key sorts the ids
        assert_eq!(
            result.reasons,
            vec![Reason::with_source("EXIT_TRIGGERED", "X2")]
        );
        assert!(result.state_key.starts_with("ALLOW_SELL_X1,X2_"));
    }

    #[test]
    fn test_exit_not_met() {
        let plan = plan(json!({
            "ticker": "T",
            "exit_rules": {"conditions": [{"id": "X1", "condition_expr": "Close < 0"}]}
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Holding, None).unwrap();

        assert_eq!(result.decision, Verdict::Block);
        assert_eq!(result.reasons, vec![Reason::new("EXIT_CONDITION_NOT_MET")]);
        assert_eq!(result.state_key, "BLOCK_NONE_NONE_I7G62CUI");
    }

    #[test]
    fn test_exit_ignores_entry_rules() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{"id": "E1", "condition_expr": "Close > 0"}],
            "exit_rules": {"conditions": []}
        }));
        let result =
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Holding, None).unwrap();
        assert_eq!(result.decision, Verdict::Block);
        assert_eq!(result.action, Action::None);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let plan = plan(json!({
            "ticker": "T",
            "indicators": [{"id": "sma3", "type": "MA", "period": 3}],
            "entry_rules": [{"id": "E1", "condition_expr": "Close > ind.sma3"}]
        }));
        let defs = plan.indicator_defs().unwrap();
        let input = bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let first =
            evaluate_with_bars(&plan, &input, &defs, PositionState::Flat, None).unwrap();
        let second =
            evaluate_with_bars(&plan, &input, &defs, PositionState::Flat, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_live_price_can_flip_the_decision() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{"id": "E1", "condition_expr": "Close > 11"}]
        }));
        let input = bars(&[10.0, 11.0]);
        let without =
            evaluate_with_bars(&plan, &input, &[], PositionState::Flat, None).unwrap();
        let with =
            evaluate_with_bars(&plan, &input, &[], PositionState::Flat, Some(12.0)).unwrap();
        assert_eq!(without.decision, Verdict::Block);
        assert_eq!(with.decision, Verdict::Allow);
    }

    #[test]
    fn test_fatal_expression_error_surfaces() {
        let plan = plan(json!({
            "ticker": "T",
            "entry_rules": [{"id": "E1", "condition_expr": "Close / (Close - Close)"}]
        }));
        assert!(
            evaluate_with_bars(&plan, &bars(&[10.0]), &[], PositionState::Flat, None).is_err()
        );
    }
}
