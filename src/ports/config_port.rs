//! Configuration access port.

use chrono::NaiveDate;

use crate::domain::error::StockcastError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Window lengths and counts; negative values clamp to 0 so validation
    /// can reject them as non-positive.
    fn get_usize(&self, section: &str, key: &str, default: usize) -> usize {
        let value = self.get_int(section, key, default as i64);
        usize::try_from(value).unwrap_or(0)
    }

    /// `Ok(None)` when absent, an error when present but not `YYYY-MM-DD`.
    fn get_date(&self, section: &str, key: &str) -> Result<Option<NaiveDate>, StockcastError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| StockcastError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: "invalid date format (expected YYYY-MM-DD)".into(),
                }),
        }
    }
}
