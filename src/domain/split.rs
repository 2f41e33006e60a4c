//! Chronological train/test split.

use crate::domain::error::StockcastError;

pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// Splits `rows` in order: the first `floor(len * ratio)` rows train, the rest test.
///
/// Rows are never shuffled, so every test row is later than every train row.
pub fn train_test_split<T>(rows: &[T], train_ratio: f64) -> Result<(&[T], &[T]), StockcastError> {
    if !(train_ratio > 0.0 && train_ratio < 1.0) {
        return Err(StockcastError::ConfigInvalid {
            section: "model".into(),
            key: "train_ratio".into(),
            reason: format!("train_ratio must lie strictly between 0 and 1, got {train_ratio}"),
        });
    }

    let cut = (rows.len() as f64 * train_ratio).floor() as usize;
    let (train, test) = rows.split_at(cut.min(rows.len()));

    if train.is_empty() || test.is_empty() {
        return Err(StockcastError::DegenerateSplit {
            train: train.len(),
            test: test.len(),
        });
    }

    Ok((train, test))
}
