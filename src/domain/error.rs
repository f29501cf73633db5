//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for sentitrade.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("failed to read {file}: {source}")]
    ReadInput {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {file}: {reason}")]
    Csv { file: String, reason: String },

    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file} line {line}: invalid date '{value}' in column '{column}'")]
    InvalidDate {
        file: String,
        line: usize,
        column: String,
        value: String,
    },

    #[error("{file} line {line}: invalid value '{value}' in column '{column}': {reason}")]
    InvalidValue {
        file: String,
        line: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("duplicate sentiment rows for {date} (lines {first_line} and {line})")]
    DuplicateSentimentDate {
        date: NaiveDate,
        first_line: usize,
        line: usize,
    },

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

    #[error("report rendering failed: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            AnalysisError::Io(_)
            | AnalysisError::ReadInput { .. }
            | AnalysisError::Render { .. } => 1,
            AnalysisError::ConfigParse { .. }
            | AnalysisError::ConfigMissing { .. }
            | AnalysisError::ConfigInvalid { .. } => 2,
            AnalysisError::Csv { .. } | AnalysisError::MissingColumn { .. } => 3,
            AnalysisError::InvalidDate { .. } | AnalysisError::InvalidValue { .. } => 4,
            AnalysisError::DuplicateSentimentDate { .. } => 5,
        }
    }
}

impl From<&AnalysisError> for std::process::ExitCode {
    fn from(err: &AnalysisError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
