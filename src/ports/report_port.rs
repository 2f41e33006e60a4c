//! Report generation port.

use std::path::Path;

use crate::domain::error::StockcastError;
use crate::domain::pipeline::{BacktestReport, PredictionReport};

pub trait ReportPort {
    fn write(&self, report: &PredictionReport, output_dir: &Path) -> Result<(), StockcastError>;

    fn write_backtest(
        &self,
        report: &BacktestReport,
        output_dir: &Path,
    ) -> Result<(), StockcastError>;
}
