use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the insights pipeline.
#[derive(Error, Debug)]
pub enum InsightError {
    /// A configured batch source file is missing or unreadable. Voids the
    /// entire extraction pass for its flavor (fail-closed).
    #[error("Batch source not found: {path}")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch document could not be parsed as JSON.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A date string did not match the `DD/MM/YYYY` batch format.
    ///
    /// Non-fatal: extraction coerces bad dates to `None` and continues;
    /// this variant exists for diagnostics at the edges.
    #[error("Invalid date format: {0}")]
    DateParse(String),

    /// An aggregation was requested on zero records. Distinct from a zero
    /// count: there is no valid "top" of nothing.
    #[error("Aggregation on empty input: {0}")]
    EmptyInput(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the insight crates.
pub type Result<T> = std::result::Result<T, InsightError>;
