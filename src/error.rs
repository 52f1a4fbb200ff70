// error.rs - Library error kinds

use thiserror::Error;

/// Errors raised by distance metrics.
///
/// Metric errors are localized: the distance-matrix engine replaces the
/// offending cell with the processing's default distance instead of aborting.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum MetricError {
    #[error("cannot coerce '{value}' for metric {metric}")]
    InputCoercion { metric: &'static str, value: String },
}

/// Errors raised by normalizers.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum NormalizeError {
    #[error("no accent-fold mapping for U+{codepoint:04X} and no substitute supplied")]
    NonMappable { codepoint: u32 },
    #[error("regexp normalizer pattern did not match '{value}'")]
    PatternMismatch { value: String },
    #[error("normalizers must not touch the id column (attribute index 0)")]
    IdColumn,
}

/// Errors raised by blocking techniques.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum BlockingError {
    #[error("blocking iterated before fit()")]
    NotFitted,
}

/// Errors raised by the MinHash/LSH engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MinhashError {
    #[error("predict() called before train()")]
    NotTrained,
    #[error("threshold must be in ]0 ; 1], got {value}")]
    BadThreshold { value: f64 },
    #[error("signature file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("signature codec failed: {0}")]
    Codec(String),
}

/// Errors raised when a processing is registered or evaluated.
///
/// These concern the shape of the data model and are fatal for the current
/// align() call.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ProcessingError {
    #[error("attribute index {index} out of bounds for records of arity {arity}")]
    AttributeOutOfBounds { index: usize, arity: usize },
    #[error("processing produced a {found_rows}x{found_cols} matrix, expected {expected_rows}x{expected_cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        found_rows: usize,
        found_cols: usize,
    },
}

/// Errors raised by record ingestion (CSV files, SPARQL/RQL endpoints).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("endpoint query failed: {0}")]
    EndpointFailure(String),
}

/// Errors raised by the aligners.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AlignError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error(transparent)]
    Blocking(#[from] BlockingError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Errors raised by the named-entity recognition walk.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum NerError {
    #[error("cancellation requested")]
    Cancelled,
}

/// Errors raised by the iterative external-memory driver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    DataIo(#[from] DataIoError),
    #[error(transparent)]
    Align(#[from] AlignError),
    #[error("cache codec failed: {0}")]
    Codec(String),
    #[error("cancellation requested")]
    Cancelled,
}
