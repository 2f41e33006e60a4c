//! Single-unit position state and closed round-trip trades.

use chrono::NaiveDate;
use serde::Serialize;

/// The simulator holds at most one unit, long only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Long { entry_date: NaiveDate, buy_price: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedTrade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    /// (entry_price + exit_price) * cost_rate
    pub cost: f64,
    pub raw_profit: f64,
    pub net_profit: f64,
}

impl ClosedTrade {
    pub fn close(
        entry_date: NaiveDate,
        entry_price: f64,
        exit_date: NaiveDate,
        exit_price: f64,
        cost_rate: f64,
    ) -> Self {
        let raw_profit = exit_price - entry_price;
        let cost = (entry_price + exit_price) * cost_rate;
        Self {
            entry_date,
            exit_date,
            entry_price,
            exit_price,
            cost,
            raw_profit,
            net_profit: raw_profit - cost,
        }
    }

    pub fn is_win(&self) -> bool {
        self.net_profit > 0.0
    }
}
