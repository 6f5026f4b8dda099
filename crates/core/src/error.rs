//! Error types for the post-processing pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by discovery, parsing, aggregation and rendering.
///
/// Only [`PostError::Configuration`] and [`PostError::InvalidConstant`] abort a
/// run. The pipeline absorbs the per-snapshot variants and keeps going.
#[derive(Debug, Error)]
pub enum PostError {
    /// Case root or configuration file cannot be used.
    #[error("Configuration error at '{}': {reason}", path.display())]
    Configuration { path: PathBuf, reason: String },

    /// A physical constant is outside its admissible range.
    #[error("Invalid constant {name} = {value}: {reason}")]
    InvalidConstant {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Derived quantity would divide by a zero conductivity.
    #[error("Division by zero: thermal conductivity is 0")]
    DivisionByZero,

    /// Operation received input it cannot reduce (e.g. an empty series).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An existing field file could not be read.
    #[error("Failed to read field file '{}': {source}", path.display())]
    FieldRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The external visualization engine failed.
    #[error("Render error: {0}")]
    Render(String),
}

impl PostError {
    /// Create a `Configuration` error from a path and a cause.
    pub fn configuration(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::InvalidConstant { .. }
        )
    }
}
