//! Domain error types.

/// A scanner-level error with position information, produced while a single
/// grammar matcher is consuming rule text.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

/// A rule that failed to parse or validate. Any one of these aborts the
/// whole run: silently dropping a seller-authored rule would change the
/// financial semantics of the remaining set.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleError {
    #[error(
        "unrecognized rule '{text}'; accepted forms: \
         'ACTION if pct_change Wh >= X% then P%', \
         'ACTION if pct_change Wh <= X% then P%', \
         'ACTION if pct_change Wh in [A%, B%] then P%'"
    )]
    Syntax { text: String },

    #[error("window_hours must be one of 1,2,4,6,12,24 (got {window})")]
    UnsupportedWindow { window: u32 },

    #[error("range low cannot exceed high (got [{low}%, {high}%])")]
    InvalidRange { low: f64, high: f64 },
}

/// Top-level error type for tradesig.
#[derive(Debug, thiserror::Error)]
pub enum TradesigError {
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

    #[error("protected dataset error: {reason}")]
    Dataset { reason: String },

    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error("insufficient price data: have {samples} samples, need {minimum}")]
    InsufficientData { samples: usize, minimum: usize },

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesigError {
    /// Short category label recorded in machine-readable failure output.
    pub fn kind(&self) -> &'static str {
        match self {
            TradesigError::Io(_) => "IoError",
            TradesigError::ConfigParse { .. }
            | TradesigError::ConfigMissing { .. }
            | TradesigError::ConfigInvalid { .. } => "ConfigError",
            TradesigError::Dataset { .. } => "DatasetError",
            TradesigError::MarketData { .. } => "MarketDataError",
            TradesigError::InsufficientData { .. } => "InsufficientDataError",
            TradesigError::Rule(RuleError::Syntax { .. }) => "RuleSyntaxError",
            TradesigError::Rule(RuleError::UnsupportedWindow { .. }) => "InvalidWindowError",
            TradesigError::Rule(RuleError::InvalidRange { .. }) => "InvalidRangeError",
        }
    }
}

impl From<&TradesigError> for std::process::ExitCode {
    fn from(err: &TradesigError) -> Self {
        let code: u8 = match err {
            TradesigError::Io(_) => 1,
            TradesigError::ConfigParse { .. }
            | TradesigError::ConfigMissing { .. }
            | TradesigError::ConfigInvalid { .. } => 2,
            TradesigError::Dataset { .. } => 3,
            TradesigError::Rule(_) => 4,
            TradesigError::MarketData { .. } | TradesigError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
