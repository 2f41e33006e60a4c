//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod estimator;
pub mod split;
pub mod evaluation;
pub mod forecast;
pub mod recommendation;
pub mod pipeline;
pub mod config_validation;
pub mod error;
