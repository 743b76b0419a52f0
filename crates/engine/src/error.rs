use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by a downstream record consumer.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid row format at line {line}: expected 4 fields but got {found}")]
    MalformedRow { line: u64, found: usize },

    #[error("Failed to parse {field} at line {line}: '{value}' is not an integer ({source})")]
    FieldParse {
        line: u64,
        field: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Start time must be provided")]
    MissingStartTime,

    #[error("Timestamp at line {line} is out of the representable range")]
    TimestampOutOfRange { line: u64 },

    #[error("Unknown metric type: {0}")]
    UnknownMetric(String),

    #[error("Callback error: {0}")]
    Callback(#[source] CallbackError),

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading CSV row: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
