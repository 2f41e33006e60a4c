//! Per-ticker prediction pipeline.
//!
//! fetch → indicators → signals → split → fit → evaluate → simulate →
//! rollout → recommend. Each call owns its series and results; a failure
//! aborts only that ticker.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::backtest::{self, BacktestResult, SimulationOutcome, DEFAULT_COST_RATE};
use crate::domain::error::StockcastError;
use crate::domain::estimator::{rank_importances, training_set, Estimator, FeatureImportance, Predictor};
use crate::domain::evaluation::{evaluate, RegressionMetrics, TestPrediction};
use crate::domain::forecast::{rollout, ForecastRow};
use crate::domain::indicator::{compute_indicator_sets, IndicatorConfig};
use crate::domain::metrics;
use crate::domain::ohlcv::validate_series;
use crate::domain::recommendation::{recommend, Recommendation};
use crate::domain::signal::{generate_signals, SignalRow};
use crate::domain::split::{train_test_split, DEFAULT_TRAIN_RATIO};
use crate::ports::data_port::DataPort;

/// Fewest signal rows that can still be split into train and test.
pub const MIN_SIGNAL_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub indicators: IndicatorConfig,
    pub cost_rate: f64,
    pub train_ratio: f64,
}

impl PipelineConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            indicators: IndicatorConfig::default(),
            cost_rate: DEFAULT_COST_RATE,
            train_ratio: DEFAULT_TRAIN_RATIO,
        }
    }
}

/// Historical replay only, no model involved.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub ticker: String,
    pub rows: Vec<SignalRow>,
    pub plain_profit: f64,
    pub outcome: SimulationOutcome,
    pub backtest: BacktestResult,
}

#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub ticker: String,
    /// Full indicator/signal-augmented series, warmup rows dropped.
    pub rows: Vec<SignalRow>,
    pub train_rows: usize,
    pub test_predictions: Vec<TestPrediction>,
    pub evaluation: RegressionMetrics,
    /// Most important first; empty when the model reports none.
    pub feature_importances: Vec<FeatureImportance>,
    pub forecast: Vec<ForecastRow>,
    pub recommendation: Recommendation,
    pub plain_profit: f64,
    pub outcome: SimulationOutcome,
    pub backtest: BacktestResult,
}

/// Trims and upper-cases a ticker; empty input is a fetch failure.
pub fn normalize_ticker(raw: &str) -> Result<String, StockcastError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(StockcastError::Fetch {
            ticker: raw.to_string(),
            reason: "empty ticker".into(),
        });
    }
    Ok(ticker)
}

/// Fetches a ticker and builds its signal rows.
///
/// Fails with `InsufficientHistory` before any modelling when fewer than
/// [`MIN_SIGNAL_ROWS`] rows survive warmup.
pub fn prepare_rows(
    data_port: &dyn DataPort,
    raw_ticker: &str,
    config: &PipelineConfig,
) -> Result<(String, Vec<SignalRow>), StockcastError> {
    let ticker = normalize_ticker(raw_ticker)?;

    info!(
        ticker = %ticker,
        start = %config.start_date,
        end = %config.end_date,
        "fetching price series"
    );
    let points = data_port.fetch_prices(&ticker, config.start_date, config.end_date)?;
    validate_series(&ticker, &points)?;

    let sets = compute_indicator_sets(&points, &config.indicators);
    let rows = generate_signals(&points, &sets);
    debug!(
        ticker = %ticker,
        points = points.len(),
        rows = rows.len(),
        warmup = config.indicators.warmup(),
        "signals generated"
    );

    if rows.len() < MIN_SIGNAL_ROWS {
        return Err(StockcastError::InsufficientHistory {
            ticker,
            rows: rows.len(),
            minimum: MIN_SIGNAL_ROWS,
        });
    }

    Ok((ticker, rows))
}

fn replay(ticker: &str, rows: &[SignalRow], cost_rate: f64) -> (f64, SimulationOutcome, BacktestResult) {
    let plain_profit = backtest::simulate_plain(rows);
    let outcome = backtest::simulate(rows, cost_rate);
    let result = metrics::report(&outcome);

    if result.trade_count == 0 {
        warn!(ticker = %ticker, "backtest closed no trades; win rate and drawdown reported as 0");
    }
    info!(
        ticker = %ticker,
        trades = result.trade_count,
        net_profit = result.net_profit,
        plain_profit,
        "backtest complete"
    );

    (plain_profit, outcome, result)
}

pub fn run_backtest_only(
    data_port: &dyn DataPort,
    raw_ticker: &str,
    config: &PipelineConfig,
) -> Result<BacktestReport, StockcastError> {
    let (ticker, rows) = prepare_rows(data_port, raw_ticker, config)?;
    let (plain_profit, outcome, backtest) = replay(&ticker, &rows, config.cost_rate);

    Ok(BacktestReport {
        ticker,
        rows,
        plain_profit,
        outcome,
        backtest,
    })
}

pub fn run_prediction<E: Estimator>(
    data_port: &dyn DataPort,
    estimator: &E,
    raw_ticker: &str,
    config: &PipelineConfig,
) -> Result<PredictionReport, StockcastError> {
    let (ticker, rows) = prepare_rows(data_port, raw_ticker, config)?;

    let (train, test) = train_test_split(&rows, config.train_ratio)?;
    let (features, targets) = training_set(train);
    info!(ticker = %ticker, train = train.len(), test = test.len(), "fitting estimator");
    let model = estimator.fit(&features, &targets)?;

    let (test_predictions, evaluation) = evaluate(&model, test);
    debug!(
        ticker = %ticker,
        mae = evaluation.mae,
        rmse = evaluation.rmse,
        r2 = evaluation.r2,
        "held-out evaluation"
    );

    let feature_importances = model
        .feature_importances()
        .map(|values| rank_importances(&values))
        .unwrap_or_default();

    let (plain_profit, outcome, backtest) = replay(&ticker, &rows, config.cost_rate);

    let last = rows
        .last()
        .ok_or_else(|| StockcastError::InsufficientHistory {
            ticker: ticker.clone(),
            rows: 0,
            minimum: MIN_SIGNAL_ROWS,
        })?;
    let forecast = rollout(&model, last);
    let recommendation = recommend(&forecast);
    info!(ticker = %ticker, recommendation = %recommendation, "forecast complete");

    let train_rows = train.len();
    Ok(PredictionReport {
        ticker,
        rows,
        train_rows,
        test_predictions,
        evaluation,
        feature_importances,
        forecast,
        recommendation,
        plain_profit,
        outcome,
        backtest,
    })
}
