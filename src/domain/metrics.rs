//! Reduction of a simulation outcome into headline risk/return figures.

use super::backtest::{BacktestResult, SimulationOutcome};

/// Rounds half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn report(outcome: &SimulationOutcome) -> BacktestResult {
    BacktestResult {
        net_profit: round2(outcome.net_profit()),
        win_rate: round2(win_rate(&outcome.trade_profits)),
        max_drawdown: round2(max_drawdown(&outcome.equity_curve)),
        trade_count: outcome.trade_count(),
        total_cost: round2(outcome.total_cost),
    }
}

/// Percent of trades with strictly positive profit; 0 with no trades.
pub fn win_rate(trade_profits: &[f64]) -> f64 {
    if trade_profits.is_empty() {
        return 0.0;
    }
    let wins = trade_profits.iter().filter(|&&p| p > 0.0).count();
    100.0 * wins as f64 / trade_profits.len() as f64
}

/// Most negative `equity[i] - max(equity[..=i])`; 0 for an empty curve.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        max_dd = max_dd.min(equity - peak);
    }
    max_dd
}
