//! Reduction of a forecast to a categorical recommendation.

use serde::Serialize;
use std::fmt;

use crate::domain::forecast::{buy_count, ForecastRow};

const STRONG_BUY_MIN: usize = 4;
const HOLD_MIN: usize = 2;

/// Ordered from most bearish to most bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Recommendation {
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "STRONG_BUY")]
    StrongBuy,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Sell => write!(f, "SELL"),
            Recommendation::Hold => write!(f, "HOLD"),
            Recommendation::StrongBuy => write!(f, "STRONG BUY"),
        }
    }
}

impl Recommendation {
    pub fn from_buy_count(buys: usize) -> Self {
        if buys >= STRONG_BUY_MIN {
            Recommendation::StrongBuy
        } else if buys >= HOLD_MIN {
            Recommendation::Hold
        } else {
            Recommendation::Sell
        }
    }
}

pub fn recommend(forecast: &[ForecastRow]) -> Recommendation {
    Recommendation::from_buy_count(buy_count(forecast))
}
