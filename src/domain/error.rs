//! Domain error types.

/// Top-level error type for twstock.
#[derive(Debug, thiserror::Error)]
pub enum RecommenderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid configuration [{section}] {key}: {reason}")]
    InvalidConfiguration {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid series for {code}: {reason}")]
    InvalidSeries { code: String, reason: String },

    #[error(
        "insufficient history for {indicator}: index {index} requested, first defined index is {first_defined}"
    )]
    InsufficientHistory {
        indicator: String,
        index: usize,
        first_defined: usize,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RecommenderError {
    pub(crate) fn invalid_config(section: &str, key: &str, reason: impl Into<String>) -> Self {
        RecommenderError::InvalidConfiguration {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_series(code: &str, reason: impl Into<String>) -> Self {
        RecommenderError::InvalidSeries {
            code: code.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error only concerns a single instrument and the run may continue.
    pub fn is_per_instrument(&self) -> bool {
        matches!(
            self,
            RecommenderError::InvalidSeries { .. }
                | RecommenderError::InsufficientHistory { .. }
                | RecommenderError::Data { .. }
        )
    }
}

impl From<&RecommenderError> for std::process::ExitCode {
    fn from(err: &RecommenderError) -> Self {
        let code: u8 = match err {
            RecommenderError::Io(_) => 1,
            RecommenderError::ConfigParse { .. }
            | RecommenderError::ConfigMissing { .. }
            | RecommenderError::InvalidConfiguration { .. } => 2,
            RecommenderError::Data { .. } => 3,
            RecommenderError::InvalidSeries { .. }
            | RecommenderError::InsufficientHistory { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
