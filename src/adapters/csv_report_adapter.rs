//! CSV report adapter implementing ReportPort.
//!
//! Writes one file per output structure so any charting or spreadsheet tool
//! can consume them:
//! - `series.csv`: indicator/signal-augmented series with BUY/SELL markers
//! - `test_predictions.csv`: actual vs. predicted close on the held-out split
//! - `forecast.csv`: the five-day rollout
//! - `trades.csv`: closed round trips from the cost-aware replay
//! - `feature_importances.csv`: per-feature model weight, when the model has one
//! - `summary.csv`: headline metrics and the recommendation

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::StockcastError;
use crate::domain::pipeline::{BacktestReport, PredictionReport};
use crate::domain::position::ClosedTrade;
use crate::domain::signal::{Signal, SignalRow};
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

#[derive(Serialize)]
struct SeriesRecord {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
    sma_short: f64,
    sma_long: f64,
    ema_short: f64,
    signal: Signal,
    buy_marker: Option<f64>,
    sell_marker: Option<f64>,
}

impl From<&SignalRow> for SeriesRecord {
    fn from(row: &SignalRow) -> Self {
        Self {
            date: row.point.date,
            open: row.point.open,
            high: row.point.high,
            low: row.point.low,
            close: row.point.close,
            volume: row.point.volume,
            sma_short: row.sma_short,
            sma_long: row.sma_long,
            ema_short: row.ema_short,
            signal: row.signal,
            buy_marker: row.buy_marker,
            sell_marker: row.sell_marker,
        }
    }
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    metric: &'a str,
    value: String,
}

fn csv_err(file: &str, e: csv::Error) -> StockcastError {
    StockcastError::Io(std::io::Error::other(format!("{}: {}", file, e)))
}

fn write_records<T, I>(dir: &Path, file: &str, records: I) -> Result<(), StockcastError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let path = dir.join(file);
    let mut wtr = csv::Writer::from_path(&path).map_err(|e| csv_err(file, e))?;
    for record in records {
        wtr.serialize(record).map_err(|e| csv_err(file, e))?;
    }
    wtr.flush()?;
    tracing::debug!(path = %path.display(), "report file written");
    Ok(())
}

fn summary_rows(
    ticker: &str,
    plain_profit: f64,
    report: &crate::domain::backtest::BacktestResult,
) -> Vec<(&'static str, String)> {
    vec![
        ("ticker", ticker.to_string()),
        ("plain_profit", format!("{:.2}", plain_profit)),
        ("net_profit", format!("{:.2}", report.net_profit)),
        ("win_rate", format!("{:.2}", report.win_rate)),
        ("max_drawdown", format!("{:.2}", report.max_drawdown)),
        ("trade_count", report.trade_count.to_string()),
        ("total_cost", format!("{:.2}", report.total_cost)),
    ]
}

fn write_summary(dir: &Path, rows: &[(&str, String)]) -> Result<(), StockcastError> {
    write_records(
        dir,
        "summary.csv",
        rows.iter().map(|(metric, value)| SummaryRecord {
            metric,
            value: value.clone(),
        }),
    )
}

fn write_common(
    dir: &Path,
    rows: &[SignalRow],
    trades: &[ClosedTrade],
) -> Result<(), StockcastError> {
    fs::create_dir_all(dir)?;
    write_records(dir, "series.csv", rows.iter().map(SeriesRecord::from))?;
    write_records(dir, "trades.csv", trades)?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &PredictionReport, output_dir: &Path) -> Result<(), StockcastError> {
        write_common(output_dir, &report.rows, &report.outcome.trades)?;
        write_records(output_dir, "test_predictions.csv", &report.test_predictions)?;
        write_records(output_dir, "forecast.csv", &report.forecast)?;
        if !report.feature_importances.is_empty() {
            write_records(
                output_dir,
                "feature_importances.csv",
                &report.feature_importances,
            )?;
        }

        let mut summary = summary_rows(&report.ticker, report.plain_profit, &report.backtest);
        summary.push(("recommendation", report.recommendation.to_string()));
        summary.push(("mae", format!("{:.4}", report.evaluation.mae)));
        summary.push(("rmse", format!("{:.4}", report.evaluation.rmse)));
        summary.push(("r2", format!("{:.4}", report.evaluation.r2)));
        write_summary(output_dir, &summary)
    }

    fn write_backtest(
        &self,
        report: &BacktestReport,
        output_dir: &Path,
    ) -> Result<(), StockcastError> {
        write_common(output_dir, &report.rows, &report.outcome.trades)?;
        let summary = summary_rows(&report.ticker, report.plain_profit, &report.backtest);
        write_summary(output_dir, &summary)
    }
}
