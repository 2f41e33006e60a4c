//! CLI definition and dispatch.

use chrono::{Days, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestResult, DEFAULT_COST_RATE};
use crate::domain::config_validation::validate_config;
use crate::domain::error::StockcastError;
use crate::domain::estimator::forest::{ForestConfig, RandomForestRegressor};
use crate::domain::estimator::tree::TreeConfig;
use crate::domain::indicator::{IndicatorConfig, IndicatorType};
use crate::domain::pipeline::{self, PipelineConfig};
use crate::domain::split::DEFAULT_TRAIN_RATIO;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

/// History window used when `[data] start_date` is absent.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 730;
const DEFAULT_CSV_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "stockcast", about = "Stock trend signals, forecasts and backtests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Ticker symbol, e.g. AAPL
    #[arg(short, long)]
    pub ticker: String,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory of <TICKER>.csv files; forces the CSV data source
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,
    /// Directory for CSV reports
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit a model, forecast five sessions ahead and backtest the signals
    Predict(RunArgs),
    /// Replay the trend signals without fitting a model
    Backtest(RunArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers available from the configured data source
    ListTickers {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Predict(args) => run_predict(&args),
        Command::Backtest(args) => run_backtest(&args),
        Command::Validate { config } => run_validate(&config),
        Command::ListTickers { config, data_dir } => {
            run_list_tickers(config.as_deref(), data_dir.as_deref())
        }
    }
}

fn fail(e: StockcastError) -> ExitCode {
    eprintln!("error: {e}");
    (&e).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn load_optional_config(path: Option<&Path>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            load_config(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_pipeline_config(config: &dyn ConfigPort) -> Result<PipelineConfig, StockcastError> {
    let end_date = config
        .get_date("data", "end_date")?
        .unwrap_or_else(|| Local::now().date_naive());
    let start_date = match config.get_date("data", "start_date")? {
        Some(d) => d,
        None => default_start(end_date)?,
    };

    Ok(PipelineConfig {
        start_date,
        end_date,
        indicators: IndicatorConfig {
            sma_short: config.get_usize("indicators", "sma_short", 10),
            sma_long: config.get_usize("indicators", "sma_long", 20),
            ema_short: config.get_usize("indicators", "ema_short", 10),
        },
        cost_rate: config.get_double("backtest", "cost_rate", DEFAULT_COST_RATE),
        train_ratio: config.get_double("model", "train_ratio", DEFAULT_TRAIN_RATIO),
    })
}

fn default_start(end_date: NaiveDate) -> Result<NaiveDate, StockcastError> {
    end_date
        .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
        .ok_or_else(|| StockcastError::ConfigInvalid {
            section: "data".into(),
            key: "end_date".into(),
            reason: "end_date too early for the default lookback".into(),
        })
}

pub fn build_forest_config(config: &dyn ConfigPort) -> ForestConfig {
    let defaults = ForestConfig::default();
    let tree = TreeConfig {
        max_depth: config.get_usize("model", "max_depth", defaults.tree.max_depth),
        min_samples_split: config.get_usize(
            "model",
            "min_samples_split",
            defaults.tree.min_samples_split,
        ),
        min_samples_leaf: config.get_usize(
            "model",
            "min_samples_leaf",
            defaults.tree.min_samples_leaf,
        ),
        max_features: match config.get_usize("model", "max_features", 0) {
            0 => None,
            n => Some(n),
        },
    };
    ForestConfig {
        n_trees: config.get_usize("model", "n_trees", defaults.n_trees),
        tree,
        bootstrap: config.get_bool("model", "bootstrap", defaults.bootstrap),
        seed: config.get_usize("model", "seed", defaults.seed as usize) as u64,
    }
}

/// `--data-dir` wins over `[data] source`; the default source is CSV.
pub fn build_data_port(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
) -> Result<Box<dyn DataPort>, StockcastError> {
    if let Some(dir) = data_dir {
        return Ok(Box::new(CsvAdapter::new(dir.to_path_buf())));
    }

    let source = config
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());

    match source.as_str() {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string());
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        #[cfg(feature = "yahoo")]
        "yahoo" => Ok(Box::new(
            crate::adapters::yahoo_adapter::YahooAdapter::new()?,
        )),
        #[cfg(not(feature = "yahoo"))]
        "yahoo" => Err(StockcastError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "yahoo source requires the `yahoo` feature".into(),
        }),
        other => Err(StockcastError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown data source: {other}"),
        }),
    }
}

/// `--output` wins over `[report] output_dir`.
pub fn resolve_output_dir(config: &dyn ConfigPort, output: Option<&Path>) -> Option<PathBuf> {
    output
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from))
}

struct RunContext {
    config: FileConfigAdapter,
    pipeline: PipelineConfig,
    data_port: Box<dyn DataPort>,
    output_dir: Option<PathBuf>,
}

fn prepare(args: &RunArgs) -> Result<RunContext, ExitCode> {
    let config = load_optional_config(args.config.as_deref())?;
    validate_config(&config).map_err(fail)?;
    let pipeline = build_pipeline_config(&config).map_err(fail)?;
    let data_port = build_data_port(&config, args.data_dir.as_deref()).map_err(fail)?;
    let output_dir = resolve_output_dir(&config, args.output.as_deref());
    Ok(RunContext {
        config,
        pipeline,
        data_port,
        output_dir,
    })
}

fn run_predict(args: &RunArgs) -> ExitCode {
    let ctx = match prepare(args) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let estimator = RandomForestRegressor::new(build_forest_config(&ctx.config));

    eprintln!(
        "Running prediction: {} from {} to {}",
        args.ticker.trim().to_uppercase(),
        ctx.pipeline.start_date,
        ctx.pipeline.end_date
    );
    let report = match pipeline::run_prediction(
        ctx.data_port.as_ref(),
        &estimator,
        &args.ticker,
        &ctx.pipeline,
    ) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    eprintln!(
        "  Rows: {} ({} train, {} test)",
        report.rows.len(),
        report.train_rows,
        report.test_predictions.len()
    );
    eprintln!("\n=== Model Evaluation (held-out) ===");
    eprintln!("MAE:              {:.4}", report.evaluation.mae);
    eprintln!("RMSE:             {:.4}", report.evaluation.rmse);
    eprintln!("R2:               {:.4}", report.evaluation.r2);
    if !report.feature_importances.is_empty() {
        eprintln!("Top features:");
        for f in report.feature_importances.iter().take(3) {
            eprintln!("  {:<10}  {:.3}", f.feature, f.importance);
        }
    }

    eprintln!("\n=== 5-Day Forecast ===");
    for row in &report.forecast {
        eprintln!(
            "  {:<6}  {:>10.2}  {}",
            row.horizon_label, row.predicted_close, row.signal
        );
    }
    eprintln!("\nRecommendation:   {}", report.recommendation);

    print_backtest_summary(report.plain_profit, &report.backtest);

    if let Some(dir) = &ctx.output_dir {
        if let Err(e) = CsvReportAdapter.write(&report, dir) {
            return fail(e);
        }
        eprintln!("\nReports written to: {}", dir.display());
    }
    ExitCode::SUCCESS
}

fn run_backtest(args: &RunArgs) -> ExitCode {
    let ctx = match prepare(args) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let report =
        match pipeline::run_backtest_only(ctx.data_port.as_ref(), &args.ticker, &ctx.pipeline) {
            Ok(r) => r,
            Err(e) => return fail(e),
        };

    eprintln!(
        "Backtest: {}  {} rows, {} to {}",
        report.ticker,
        report.rows.len(),
        ctx.pipeline.start_date,
        ctx.pipeline.end_date
    );
    print_backtest_summary(report.plain_profit, &report.backtest);

    if let Some(dir) = &ctx.output_dir {
        if let Err(e) = CsvReportAdapter.write_backtest(&report, dir) {
            return fail(e);
        }
        eprintln!("\nReports written to: {}", dir.display());
    }
    ExitCode::SUCCESS
}

fn print_backtest_summary(plain_profit: f64, result: &BacktestResult) {
    eprintln!("\n=== Backtest ===");
    eprintln!("Plain Profit:     {:.2}", plain_profit);
    eprintln!("Net Profit:       {:.2}", result.net_profit);
    eprintln!("Total Cost:       {:.2}", result.total_cost);
    eprintln!("Total Trades:     {}", result.trade_count);
    eprintln!("Win Rate:         {:.2}%", result.win_rate);
    eprintln!("Max Drawdown:     {:.2}", result.max_drawdown);
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        return fail(e);
    }
    let pipeline = match build_pipeline_config(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let forest = build_forest_config(&adapter);

    eprintln!("\nData:");
    eprintln!(
        "  source: {}",
        adapter
            .get_string("data", "source")
            .unwrap_or_else(|| "csv".to_string())
    );
    eprintln!("  range:  {} to {}", pipeline.start_date, pipeline.end_date);
    eprintln!("\nIndicators:");
    let indicators = [
        IndicatorType::Sma(pipeline.indicators.sma_short),
        IndicatorType::Sma(pipeline.indicators.sma_long),
        IndicatorType::Ema(pipeline.indicators.ema_short),
    ];
    for indicator in &indicators {
        eprintln!("  {}", indicator);
    }
    eprintln!("\nModel:");
    eprintln!(
        "  {} trees, max depth {}, seed {}, train ratio {}",
        forest.n_trees, forest.tree.max_depth, forest.seed, pipeline.train_ratio
    );
    eprintln!("  cost rate: {}", pipeline.cost_rate);

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}

fn run_list_tickers(config_path: Option<&Path>, data_dir: Option<&Path>) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data_port = match build_data_port(&config, data_dir) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let tickers = match data_port.list_tickers() {
        Ok(t) => t,
        Err(e) => return fail(e),
    };

    if tickers.is_empty() {
        eprintln!("No tickers found");
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        eprintln!("{} tickers found", tickers.len());
    }
    ExitCode::SUCCESS
}
