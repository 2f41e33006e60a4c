//! Domain error types.

/// Top-level error type for stockcast.
///
/// Every variant aborts the single prediction request it was raised in;
/// nothing here is shared between requests.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
    #[error("failed to fetch {ticker}: {reason}")]
    Fetch { ticker: String, reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("malformed price series for {ticker}: {reason}")]
    MalformedSeries { ticker: String, reason: String },

    #[error("insufficient history for {ticker}: have {rows} usable rows, need {minimum}")]
    InsufficientHistory {
        ticker: String,
        rows: usize,
        minimum: usize,
    },

    #[error("degenerate train/test split: {train} train rows, {test} test rows")]
    DegenerateSplit { train: usize, test: usize },

    #[error("estimator error: {reason}")]
    Estimator { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        let code: u8 = match err {
            StockcastError::Io(_) => 1,
            StockcastError::ConfigParse { .. }
            | StockcastError::ConfigMissing { .. }
            | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::Fetch { .. }
            | StockcastError::NoData { .. }
            | StockcastError::MalformedSeries { .. } => 3,
            StockcastError::InsufficientHistory { .. } | StockcastError::DegenerateSplit { .. } => 5,
            StockcastError::Estimator { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
