//! INI file configuration adapter.

use crate::domain::error::StockcastError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StockcastError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| StockcastError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, StockcastError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| StockcastError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// An adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[data]
source = csv
csv_dir = ./data
start_date = 2022-01-03

[indicators]
sma_short = 5
sma_long = 15

[backtest]
cost_rate = 0.002

[model]
bootstrap = no
"#;

    #[test]
    fn reads_typed_values() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("csv".into()));
        assert_eq!(adapter.get_int("indicators", "sma_short", 10), 5);
        assert_eq!(adapter.get_usize("indicators", "sma_long", 20), 15);
        assert_eq!(adapter.get_double("backtest", "cost_rate", 0.001), 0.002);
        assert!(!adapter.get_bool("model", "bootstrap", true));
    }

    #[test]
    fn defaults_for_missing_keys() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("data", "missing"), None);
        assert_eq!(adapter.get_int("indicators", "ema_short", 10), 10);
        assert_eq!(adapter.get_double("model", "train_ratio", 0.8), 0.8);
        assert!(adapter.get_bool("missing_section", "key", true));
    }

    #[test]
    fn defaults_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[indicators]\nsma_long = abc\n").unwrap();
        assert_eq!(adapter.get_int("indicators", "sma_long", 20), 20);
        assert_eq!(adapter.get_double("indicators", "sma_long", 1.5), 1.5);
    }

    #[test]
    fn negative_usize_clamps_to_zero() {
        let adapter = FileConfigAdapter::from_string("[indicators]\nsma_long = -4\n").unwrap();
        assert_eq!(adapter.get_usize("indicators", "sma_long", 20), 0);
    }

    #[test]
    fn bool_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[x]\na = true\nb = yes\nc = 1\nd = no\ne = 0\n")
                .unwrap();
        assert!(adapter.get_bool("x", "a", false));
        assert!(adapter.get_bool("x", "b", false));
        assert!(adapter.get_bool("x", "c", false));
        assert!(!adapter.get_bool("x", "d", true));
        assert!(!adapter.get_bool("x", "e", true));
    }

    #[test]
    fn dates() {
        let adapter =
            FileConfigAdapter::from_string("[data]\nstart_date = 2022-01-03\nend_date = soon\n")
                .unwrap();
        assert_eq!(
            adapter.get_date("data", "start_date").unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 3)
        );
        assert_eq!(adapter.get_date("data", "missing").unwrap(), None);
        let err = adapter.get_date("data", "end_date").unwrap_err();
        assert!(matches!(err, StockcastError::ConfigInvalid { key, .. } if key == "end_date"));
    }

    #[test]
    fn empty_adapter_uses_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_usize("indicators", "sma_long", 20), 20);
        assert_eq!(adapter.get_string("data", "source"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[report]\noutput_dir = /tmp/out\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "output_dir"),
            Some("/tmp/out".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, StockcastError::ConfigParse { .. }));
    }
}
