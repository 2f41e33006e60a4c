//! Configuration validation.
//!
//! Checks every config field before a pipeline runs. Absent keys fall back
//! to their defaults and are not errors; present but unusable values are.

use crate::domain::error::StockcastError;
use crate::ports::config_port::ConfigPort;

pub const DATA_SOURCES: [&str; 2] = ["csv", "yahoo"];

/// Numeric keys and the integer/float/bool form their value must parse as.
const TYPED_KEYS: [(&str, &str, ValueKind); 12] = [
    ("indicators", "sma_short", ValueKind::Int),
    ("indicators", "sma_long", ValueKind::Int),
    ("indicators", "ema_short", ValueKind::Int),
    ("backtest", "cost_rate", ValueKind::Float),
    ("model", "train_ratio", ValueKind::Float),
    ("model", "n_trees", ValueKind::Int),
    ("model", "max_depth", ValueKind::Int),
    ("model", "min_samples_split", ValueKind::Int),
    ("model", "min_samples_leaf", ValueKind::Int),
    ("model", "max_features", ValueKind::Int),
    ("model", "seed", ValueKind::Int),
    ("model", "bootstrap", ValueKind::Bool),
];

#[derive(Debug, Clone, Copy)]
enum ValueKind {
    Int,
    Float,
    Bool,
}

impl ValueKind {
    fn accepts(self, value: &str) -> bool {
        match self {
            ValueKind::Int => value.parse::<i64>().is_ok(),
            ValueKind::Float => value.parse::<f64>().is_ok_and(f64::is_finite),
            ValueKind::Bool => matches!(
                value.to_lowercase().as_str(),
                "true" | "yes" | "1" | "false" | "no" | "0"
            ),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ValueKind::Int => "an integer",
            ValueKind::Float => "a finite number",
            ValueKind::Bool => "true or false",
        }
    }
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    validate_value_types(config)?;
    validate_data_source(config)?;
    validate_dates(config)?;
    validate_windows(config)?;
    validate_cost_rate(config)?;
    validate_model(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> StockcastError {
    StockcastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Typed getters fall back to defaults on unparseable text, so a typo has
/// to be caught here or it silently runs with the default.
fn validate_value_types(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    for (section, key, kind) in TYPED_KEYS {
        let Some(raw) = config.get_string(section, key) else {
            continue;
        };
        let value = raw.trim();
        if !value.is_empty() && !kind.accepts(value) {
            return Err(invalid(
                section,
                key,
                &format!("{} must be {}, got '{}'", key, kind.describe(), value),
            ));
        }
    }
    Ok(())
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    match config.get_string("data", "source") {
        None => Ok(()),
        Some(s) if DATA_SOURCES.contains(&s.trim().to_lowercase().as_str()) => Ok(()),
        Some(_) => Err(invalid("data", "source", "source must be one of: csv, yahoo")),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    let start_date = config.get_date("data", "start_date")?;
    let end_date = config.get_date("data", "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(invalid(
                "data",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    for key in ["sma_short", "sma_long", "ema_short"] {
        if config.get_int("indicators", key, 1) < 1 {
            return Err(invalid(
                "indicators",
                key,
                &format!("{} must be a positive window length", key),
            ));
        }
    }

    let short = config.get_int("indicators", "sma_short", 10);
    let long = config.get_int("indicators", "sma_long", 20);
    if short >= long {
        return Err(invalid(
            "indicators",
            "sma_short",
            "sma_short must be shorter than sma_long",
        ));
    }
    Ok(())
}

fn validate_cost_rate(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    let value = config.get_double("backtest", "cost_rate", 0.001);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "cost_rate",
            "cost_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_model(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    let ratio = config.get_double("model", "train_ratio", 0.8);
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(invalid(
            "model",
            "train_ratio",
            "train_ratio must be strictly between 0 and 1",
        ));
    }

    if config.get_int("model", "n_trees", 100) < 1 {
        return Err(invalid("model", "n_trees", "n_trees must be at least 1"));
    }
    if config.get_int("model", "max_depth", 10) < 1 {
        return Err(invalid("model", "max_depth", "max_depth must be at least 1"));
    }
    if config.get_int("model", "min_samples_split", 2) < 2 {
        return Err(invalid(
            "model",
            "min_samples_split",
            "min_samples_split must be at least 2",
        ));
    }
    if config.get_int("model", "min_samples_leaf", 1) < 1 {
        return Err(invalid(
            "model",
            "min_samples_leaf",
            "min_samples_leaf must be at least 1",
        ));
    }
    if config.get_int("model", "seed", 42) < 0 {
        return Err(invalid("model", "seed", "seed must be non-negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn invalid_key(content: &str) -> String {
        match validate_config(&make_config(content)).unwrap_err() {
            StockcastError::ConfigInvalid { key, .. } => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_numbers_are_rejected() {
        assert_eq!(invalid_key("[indicators]\nsma_long = twenty\n"), "sma_long");
        assert_eq!(invalid_key("[backtest]\ncost_rate = abc\n"), "cost_rate");
        assert_eq!(invalid_key("[model]\nn_trees = 10.5\n"), "n_trees");
        assert_eq!(invalid_key("[model]\ntrain_ratio = NaN\n"), "train_ratio");
        assert_eq!(invalid_key("[model]\nbootstrap = maybe\n"), "bootstrap");
    }

    #[test]
    fn unparseable_number_names_the_value() {
        let err = validate_config(&make_config("[indicators]\nsma_long = twenty\n")).unwrap_err();
        assert!(err.to_string().contains("'twenty'"));
    }

    #[test]
    fn valid_full_config_passes() {
        let config = make_config(
            r#"
[data]
source = csv
csv_dir = ./data
start_date = 2022-01-03
end_date = 2024-01-03

[indicators]
sma_short = 5
sma_long = 15
ema_short = 8

[backtest]
cost_rate = 0.002

[model]
train_ratio = 0.75
n_trees = 50
max_depth = 8
min_samples_split = 4
min_samples_leaf = 2
seed = 7
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_config_uses_valid_defaults() {
        assert!(validate_config(&FileConfigAdapter::empty()).is_ok());
    }

    #[test]
    fn unknown_source_fails() {
        assert_eq!(invalid_key("[data]\nsource = bloomberg\n"), "source");
    }

    #[test]
    fn source_is_case_insensitive() {
        assert!(validate_config(&make_config("[data]\nsource = Yahoo\n")).is_ok());
    }

    #[test]
    fn invalid_date_format_fails() {
        assert_eq!(invalid_key("[data]\nstart_date = 2022/01/03\n"), "start_date");
    }

    #[test]
    fn start_after_end_fails() {
        assert_eq!(
            invalid_key("[data]\nstart_date = 2024-01-01\nend_date = 2023-01-01\n"),
            "start_date"
        );
    }

    #[test]
    fn equal_dates_fail() {
        assert_eq!(
            invalid_key("[data]\nstart_date = 2024-01-01\nend_date = 2024-01-01\n"),
            "start_date"
        );
    }

    #[test]
    fn zero_window_fails() {
        assert_eq!(invalid_key("[indicators]\nema_short = 0\n"), "ema_short");
    }

    #[test]
    fn negative_window_fails() {
        assert_eq!(invalid_key("[indicators]\nsma_long = -3\n"), "sma_long");
    }

    #[test]
    fn short_not_below_long_fails() {
        assert_eq!(
            invalid_key("[indicators]\nsma_short = 20\nsma_long = 20\n"),
            "sma_short"
        );
    }

    #[test]
    fn negative_cost_rate_fails() {
        assert_eq!(invalid_key("[backtest]\ncost_rate = -0.01\n"), "cost_rate");
    }

    #[test]
    fn cost_rate_of_one_fails() {
        assert_eq!(invalid_key("[backtest]\ncost_rate = 1.0\n"), "cost_rate");
    }

    #[test]
    fn zero_cost_rate_passes() {
        assert!(validate_config(&make_config("[backtest]\ncost_rate = 0\n")).is_ok());
    }

    #[test]
    fn train_ratio_bounds() {
        assert_eq!(invalid_key("[model]\ntrain_ratio = 0\n"), "train_ratio");
        assert_eq!(invalid_key("[model]\ntrain_ratio = 1\n"), "train_ratio");
        assert!(validate_config(&make_config("[model]\ntrain_ratio = 0.5\n")).is_ok());
    }

    #[test]
    fn zero_trees_fails() {
        assert_eq!(invalid_key("[model]\nn_trees = 0\n"), "n_trees");
    }

    #[test]
    fn tree_limits_fail() {
        assert_eq!(invalid_key("[model]\nmax_depth = 0\n"), "max_depth");
        assert_eq!(invalid_key("[model]\nmin_samples_split = 1\n"), "min_samples_split");
        assert_eq!(invalid_key("[model]\nmin_samples_leaf = 0\n"), "min_samples_leaf");
        assert_eq!(invalid_key("[model]\nseed = -1\n"), "seed");
    }
}
