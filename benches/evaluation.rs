//! Criterion benchmarks for rule plan evaluation.

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use finance_rules::{DailyBar, PositionState, RulePlan, evaluate_with_bars, indicators};

fn synthetic_bars(count: usize) -> Vec<DailyBar> {
    (0..count)
        .map(|i| {
            let drift = (i as f64 * 0.7).sin() * 4.0;
            let close = 100.0 + i as f64 * 0.05 + drift;
            DailyBar {
                date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + chrono::Days::new(i as u64),
                open: close - 0.3,
                high: close + 1.2,
                low: close - 1.4,
                close,
                adjusted_close: Some(close * 0.98),
                volume: 1_000_000 + (i as i64 % 7) * 50_000,
            }
        })
        .collect()
}

fn benchmark_plan() -> RulePlan {
    RulePlan::from_json(
        r#"{
            "ticker": "BENCH",
            "indicators": [
                {"id": "rsi14", "type": "RSI", "period": 14},
                {"id": "sma50", "type": "MA", "period": 50},
                {"id": "vwap20", "type": "VWAP", "period": 20}
            ],
            "entry_rules": [
                {"id": "E1", "priority": 10,
                 "constraints_expr": ["Close > ind.sma50", "Volume > 500000"],
                 "condition_expr": "ind.rsi14 < 40 OR Close crossover ind.vwap20"},
                {"id": "E2", "priority": 20,
                 "condition_expr": "(Close / Close[1] - 1) * 100 > 2"}
            ],
            "exit_rules": {"conditions": [
                {"id": "X1", "condition_expr": "Close crossunder ind.sma50"},
                {"id": "X2", "condition_expr": "ind.rsi14 > 70"}
            ]}
        }"#,
    )
    .expect("benchmark plan parses")
}

fn bench_evaluation(c: &mut Criterion) {
    let plan = benchmark_plan();
    let defs = plan.indicator_defs().expect("benchmark defs materialize");
    let bars = synthetic_bars(250);

    c.bench_function("evaluate_flat_250_bars", |b| {
        b.iter(|| {
            evaluate_with_bars(
                black_box(&plan),
                black_box(&bars),
                black_box(&defs),
                PositionState::Flat,
                None,
            )
            .expect("evaluation succeeds")
        })
    });

    c.bench_function("evaluate_holding_250_bars", |b| {
        b.iter(|| {
            evaluate_with_bars(
                black_box(&plan),
                black_box(&bars),
                black_box(&defs),
                PositionState::Holding,
                Some(104.25),
            )
            .expect("evaluation succeeds")
        })
    });
}

fn bench_indicators(c: &mut Criterion) {
    let bars = synthetic_bars(250);
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    c.bench_function("rsi_14_250_bars", |b| {
        b.iter(|| indicators::rsi(black_box(&closes), 14))
    });
    c.bench_function("sma_50_250_bars", |b| {
        b.iter(|| indicators::sma(black_box(&closes), 50))
    });
}

criterion_group!(benches, bench_evaluation, bench_indicators);
criterion_main!(benches);
