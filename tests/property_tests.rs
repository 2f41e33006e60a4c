//! Property-based tests for the signal generator, simulator, metrics,
//! rollout and recommendation classifier.

mod common;

use common::*;
use proptest::prelude::*;
use stockcast::domain::backtest::{simulate, simulate_plain, simulate_with_costs};
use stockcast::domain::estimator::{FeatureRow, Predictor};
use stockcast::domain::forecast::{rollout_from, FORECAST_HORIZON};
use stockcast::domain::indicator::{compute_indicator_sets, IndicatorConfig};
use stockcast::domain::metrics::{max_drawdown, win_rate};
use stockcast::domain::recommendation::Recommendation;
use stockcast::domain::signal::{classify, generate_signals, Signal, SignalRow};

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..500.0, 0..max_len)
}

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Buy), Just(Signal::Sell)]
}

fn arb_rows(max_len: usize) -> impl Strategy<Value = Vec<SignalRow>> {
    prop::collection::vec((1.0f64..500.0, arb_signal()), 0..max_len).prop_map(|pairs| {
        let closes: Vec<f64> = pairs.iter().map(|(c, _)| *c).collect();
        points_from_closes("2024-01-01", &closes)
            .into_iter()
            .zip(pairs)
            .map(|(point, (close, signal))| {
                let sma_long = match signal {
                    Signal::Buy => close - 0.5,
                    Signal::Sell => close + 0.5,
                };
                SignalRow::new(point, close, sma_long, close)
            })
            .collect()
    })
}

/// Linear model with arbitrary weights, enough to drive the rollout.
struct Linear {
    weights: [f64; 7],
    bias: f64,
}

impl Predictor for Linear {
    fn predict(&self, row: &FeatureRow) -> f64 {
        row.to_array()
            .iter()
            .zip(self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.bias
    }
}

proptest! {
    #[test]
    fn signal_is_buy_iff_close_strictly_above(close in 0.0f64..1000.0, long in 0.0f64..1000.0) {
        let signal = classify(close, long);
        prop_assert_eq!(signal == Signal::Buy, close > long);
        prop_assert_eq!(classify(close, close), Signal::Sell);
    }

    #[test]
    fn markers_are_exclusive_and_match_signal(closes in arb_closes(80)) {
        let points = points_from_closes("2024-01-01", &closes);
        let config = IndicatorConfig { sma_short: 3, sma_long: 6, ema_short: 3 };
        let rows = generate_signals(&points, &compute_indicator_sets(&points, &config));

        prop_assert_eq!(rows.len(), points.len().saturating_sub(config.warmup()));
        for row in &rows {
            prop_assert!(row.buy_marker.is_none() || row.sell_marker.is_none());
            match row.signal {
                Signal::Buy => prop_assert_eq!(row.buy_marker, Some(row.point.close)),
                Signal::Sell => prop_assert_eq!(row.sell_marker, Some(row.point.close)),
            }
        }
    }

    #[test]
    fn trailing_buys_add_nothing(rows in arb_rows(40), tail in prop::collection::vec(1.0f64..500.0, 1..10)) {
        let base = simulate(&rows, 0.0);
        // Force flat before the tail so it opens exactly one new position.
        let mut extended = rows.clone();
        let mut closes: Vec<f64> = vec![1.0];
        closes.extend(&tail);
        let start = extended.len() as u32;
        for (i, close) in closes.iter().enumerate() {
            let signal = if i == 0 { Signal::Sell } else { Signal::Buy };
            let sma_long = if signal == Signal::Buy { close - 0.5 } else { close + 0.5 };
            let mut point = make_point("2024-01-01", *close);
            point.date = point.date + chrono::Duration::days((start + i as u32) as i64);
            extended.push(SignalRow::new(point, *close, sma_long, *close));
        }

        let flat_then_long = simulate(&extended, 0.0);
        let sell_adds = usize::from(base.open_position.is_some());
        prop_assert_eq!(flat_then_long.trade_count(), base.trade_count() + sell_adds);
        prop_assert!(flat_then_long.open_position.is_some());
    }

    #[test]
    fn costs_never_raise_profit(rows in arb_rows(60), rate in 0.0001f64..0.05) {
        let plain = simulate_plain(&rows);
        let result = simulate_with_costs(&rows, rate);
        if result.trade_count > 0 {
            prop_assert!(result.net_profit <= plain);
            prop_assert!(simulate(&rows, rate).total_cost > 0.0);
        }
    }

    #[test]
    fn metrics_stay_in_range(rows in arb_rows(60), rate in 0.0f64..0.01) {
        let result = simulate_with_costs(&rows, rate);
        prop_assert!((0.0..=100.0).contains(&result.win_rate));
        prop_assert!(result.max_drawdown <= 0.0);
        if result.trade_count == 0 {
            prop_assert_eq!(result.win_rate, 0.0);
            prop_assert_eq!(result.max_drawdown, 0.0);
            prop_assert_eq!(result.net_profit, 0.0);
        }
    }

    #[test]
    fn win_rate_and_drawdown_bounds(profits in prop::collection::vec(-100.0f64..100.0, 0..50)) {
        let rate = win_rate(&profits);
        prop_assert!((0.0..=100.0).contains(&rate));

        let mut equity = Vec::with_capacity(profits.len());
        let mut total = 0.0;
        for p in &profits {
            total += p;
            equity.push(total);
        }
        prop_assert!(max_drawdown(&equity) <= 0.0);
    }

    #[test]
    fn equity_curve_tracks_trades(rows in arb_rows(60), rate in 0.0f64..0.01) {
        let outcome = simulate(&rows, rate);
        prop_assert_eq!(outcome.equity_curve.len(), outcome.trade_count());
        prop_assert_eq!(outcome.trade_profits.len(), outcome.trade_count());
        if let Some(last) = outcome.equity_curve.last() {
            prop_assert!((last - outcome.net_profit()).abs() < 1e-6);
        }
    }

    #[test]
    fn recommendation_is_monotonic(a in 0usize..=5, b in 0usize..=5) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Recommendation::from_buy_count(lo) <= Recommendation::from_buy_count(hi));
    }

    #[test]
    fn rollout_always_has_horizon_rows(
        weights in prop::array::uniform7(-1.0f64..1.0),
        bias in -50.0f64..50.0,
        open in 1.0f64..500.0,
        long in 1.0f64..500.0,
    ) {
        let model = Linear { weights, bias };
        let start = FeatureRow {
            open,
            high: open + 1.0,
            low: open - 1.0,
            volume: 1000.0,
            sma_short: long,
            sma_long: long,
            ema_short: long,
        };
        let forecast = rollout_from(&model, start);
        prop_assert_eq!(forecast.len(), FORECAST_HORIZON);
        for (i, row) in forecast.iter().enumerate() {
            prop_assert_eq!(&row.horizon_label, &format!("Day {}", i + 1));
        }
    }
}
