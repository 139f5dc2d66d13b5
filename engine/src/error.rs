use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("History storage error: {source}")]
    Storage {
        #[from]
        source: rusqlite::Error,
    },

    #[error("History schema version {found} is not supported (expected {expected})")]
    SchemaVersion { found: i64, expected: i64 },

    #[error("Invalid history record: {0}")]
    InvalidRecord(String),

    #[error("Validation error: {0}")]
    Validation(#[from] RequestError),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("Reference data error: {0}")]
    ReferenceDataError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Validation failures while turning an OCR guess into a scoring request, or a
/// scoring response into a history record. These are user-facing, not faults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(Option<String>),

    #[error("Invalid city: {0:?}")]
    InvalidCity(Option<String>),

    #[error("Invalid gender: {0:?}. Must be \"Nam\" or \"Nữ\"")]
    InvalidGender(Option<String>),

    #[error("Missing category")]
    MissingCategory,

    #[error("Invalid transaction_day: {0:?}. Must be 0-6 (Monday=0, Sunday=6)")]
    InvalidDay(Option<u8>),

    #[error("Invalid age: {0:?}. Must be 18-100")]
    InvalidAge(Option<u32>),

    #[error("Fraud check rejected: {0}")]
    Rejected(String),

    #[error("Fraud check response carried no prediction")]
    MissingPrediction,
}
