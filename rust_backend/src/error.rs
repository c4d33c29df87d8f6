//! Error types for region statistics aggregation.

/// Result type for aggregation operations
pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// Error type for aggregation operations
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("Region '{open}' is still open, cannot start region '{requested}'")]
    RegionAlreadyOpen { open: String, requested: String },

    #[error("No region is open")]
    NoRegionOpen,

    #[error("Region '{0}' must be ended before close")]
    RegionStillOpen(String),

    #[error("Aggregator is already closed")]
    Closed,

    #[error("Region index {index} is outside the declared regions (count {count})")]
    UnknownRegion { index: usize, count: usize },

    #[error("Region name mismatch at index {index}: declared '{declared}', got '{given}'")]
    RegionNameMismatch {
        index: usize,
        declared: String,
        given: String,
    },

    #[error("Completion cursor cannot advance to {target}: cursor is at {cursor}")]
    NotIncreasing { target: usize, cursor: usize },

    #[error("Completion target {target} is out of range (universe size {size})")]
    OutOfRange { target: usize, size: usize },

    #[error("Invalid time windows: {0}")]
    InvalidTimeWindows(String),

    #[error("Invalid sample {value} in band '{band}': values must be finite and positive")]
    InvalidSample { band: String, value: f64 },

    #[error("Expected samples for {expected} bands, got {actual}")]
    BandCountMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<String> for AggregatorError {
    fn from(s: String) -> Self {
        AggregatorError::Configuration(s)
    }
}

impl From<&str> for AggregatorError {
    fn from(s: &str) -> Self {
        AggregatorError::Configuration(s.to_string())
    }
}
