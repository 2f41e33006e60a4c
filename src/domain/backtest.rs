//! Signal-driven backtest simulator.
//!
//! Replays an ordered signal sequence through a two-state machine
//! (`Flat`, `Long`) holding one unit at a time. The replay is a fold of a
//! [`Ledger`] over the rows; nothing outside the fold is mutated.
//!
//! | state | signal | transition                                  |
//! |-------|--------|---------------------------------------------|
//! | Flat  | BUY    | enter Long at close, accrue entry cost      |
//! | Long  | SELL   | exit at close, record trade and equity      |
//! | Long  | BUY    | hold                                        |
//! | Flat  | SELL   | stay flat                                   |
//!
//! A position still open when the rows run out is never closed.

use chrono::NaiveDate;
use serde::Serialize;

use super::position::{ClosedTrade, PositionState};
use super::signal::{Signal, SignalRow};

pub const DEFAULT_COST_RATE: f64 = 0.001;

/// Anything the simulator can replay: a dated close with a signal.
pub trait SignalBar {
    fn date(&self) -> NaiveDate;
    fn close(&self) -> f64;
    fn signal(&self) -> Signal;
}

impl SignalBar for SignalRow {
    fn date(&self) -> NaiveDate {
        self.point.date
    }

    fn close(&self) -> f64 {
        self.point.close
    }

    fn signal(&self) -> Signal {
        self.signal
    }
}

/// Aggregate risk/return figures for a cost-aware run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub net_profit: f64,
    /// Percent of closed trades with positive net profit, 2 dp.
    pub win_rate: f64,
    /// Minimum of equity minus running peak, 2 dp; never positive.
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub total_cost: f64,
}

/// Raw output of a replay, before reduction to a [`BacktestResult`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationOutcome {
    pub trades: Vec<ClosedTrade>,
    /// Net profit per closed trade, in exit order.
    pub trade_profits: Vec<f64>,
    /// Running sum of `trade_profits`, one point per closed trade.
    pub equity_curve: Vec<f64>,
    /// Entry and exit costs accrued over the replay.
    pub total_cost: f64,
    /// Still-open position at the end of the rows, if any.
    pub open_position: Option<(NaiveDate, f64)>,
}

impl SimulationOutcome {
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn raw_profit(&self) -> f64 {
        self.trades.iter().map(|t| t.raw_profit).sum()
    }

    pub fn net_profit(&self) -> f64 {
        self.trade_profits.iter().sum()
    }
}

/// Accumulator threaded through the replay.
#[derive(Debug, Clone)]
struct Ledger {
    cost_rate: f64,
    state: PositionState,
    equity: f64,
    outcome: SimulationOutcome,
}

impl Ledger {
    fn new(cost_rate: f64) -> Self {
        Self {
            cost_rate,
            state: PositionState::Flat,
            equity: 0.0,
            outcome: SimulationOutcome::default(),
        }
    }

    fn step<B: SignalBar>(mut self, bar: &B) -> Self {
        match (self.state, bar.signal()) {
            (PositionState::Flat, Signal::Buy) => {
                let buy_price = bar.close();
                self.outcome.total_cost += buy_price * self.cost_rate;
                self.state = PositionState::Long {
                    entry_date: bar.date(),
                    buy_price,
                };
            }
            (
                PositionState::Long {
                    entry_date,
                    buy_price,
                },
                Signal::Sell,
            ) => {
                let sell_price = bar.close();
                self.outcome.total_cost += sell_price * self.cost_rate;

                let trade =
                    ClosedTrade::close(entry_date, buy_price, bar.date(), sell_price, self.cost_rate);
                self.equity += trade.net_profit;
                self.outcome.trade_profits.push(trade.net_profit);
                self.outcome.equity_curve.push(self.equity);
                self.outcome.trades.push(trade);
                self.state = PositionState::Flat;
            }
            (PositionState::Long { .. }, Signal::Buy) | (PositionState::Flat, Signal::Sell) => {}
        }
        self
    }

    fn finish(mut self) -> SimulationOutcome {
        if let PositionState::Long {
            entry_date,
            buy_price,
        } = self.state
        {
            self.outcome.open_position = Some((entry_date, buy_price));
        }
        self.outcome
    }
}

/// Replays `bars` in the given order with a proportional cost on each leg.
pub fn simulate<B: SignalBar>(bars: &[B], cost_rate: f64) -> SimulationOutcome {
    bars.iter()
        .fold(Ledger::new(cost_rate), |ledger, bar| ledger.step(bar))
        .finish()
}

/// Total realized raw profit with costs ignored, rounded to 2 dp.
pub fn simulate_plain<B: SignalBar>(bars: &[B]) -> f64 {
    super::metrics::round2(simulate(bars, 0.0).raw_profit())
}

/// Cost-aware replay reduced to a [`BacktestResult`].
pub fn simulate_with_costs<B: SignalBar>(bars: &[B], cost_rate: f64) -> BacktestResult {
    super::metrics::report(&simulate(bars, cost_rate))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    #[derive(Debug, Clone)]
    pub struct Bar {
        pub date: NaiveDate,
        pub close: f64,
        pub signal: Signal,
    }

    impl SignalBar for Bar {
        fn date(&self) -> NaiveDate {
            self.date
        }
        fn close(&self) -> f64 {
            self.close
        }
        fn signal(&self) -> Signal {
            self.signal
        }
    }

    pub fn bars(signals: &[Signal], closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        signals
            .iter()
            .zip(closes)
            .enumerate()
            .map(|(i, (&signal, &close))| Bar {
                date: start + chrono::Duration::days(i as i64),
                close,
                signal,
            })
            .collect()
    }
}
