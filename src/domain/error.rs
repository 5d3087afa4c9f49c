//! Domain error types.

/// Top-level error type for tickwise.
#[derive(Debug, thiserror::Error)]
pub enum TickwiseError {
    #[error("missing required column {column}")]
    MissingColumn { column: String },

    #[error("column {column} has no parseable value in {rows} rows")]
    InvalidNumeric { column: String, rows: usize },

    #[error("invalid date {value:?} at row {row}")]
    InvalidDate { row: usize, value: String },

    #[error("insufficient history for {stage}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        stage: String,
        bars: usize,
        minimum: usize,
    },

    #[error("no data for {source_name}")]
    NoData { source_name: String },

    #[error("{stage} failed: {reason}")]
    Computation { stage: String, reason: String },

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
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TickwiseError {
    pub fn insufficient(stage: &str, bars: usize, minimum: usize) -> Self {
        TickwiseError::InsufficientHistory {
            stage: stage.to_string(),
            bars,
            minimum,
        }
    }

    pub fn computation(stage: &str, reason: impl Into<String>) -> Self {
        TickwiseError::Computation {
            stage: stage.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TickwiseError> for std::process::ExitCode {
    fn from(err: &TickwiseError) -> Self {
        let code: u8 = match err {
            TickwiseError::Io(_) | TickwiseError::Json(_) => 1,
            TickwiseError::ConfigParse { .. }
            | TickwiseError::ConfigMissing { .. }
            | TickwiseError::ConfigInvalid { .. } => 2,
            TickwiseError::MissingColumn { .. }
            | TickwiseError::InvalidNumeric { .. }
            | TickwiseError::InvalidDate { .. }
            | TickwiseError::NoData { .. }
            | TickwiseError::Csv(_) => 3,
            TickwiseError::InsufficientHistory { .. } => 4,
            TickwiseError::Computation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
