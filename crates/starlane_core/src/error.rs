//! Error types for the simulation core.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Top-level error type for the simulation core.
///
/// The resolver and the personalities are total functions and never return
/// these; errors only arise at the boundaries (snapshot construction, config
/// parsing, serialization).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A persisted record carried a value that cannot appear in a snapshot.
    #[error("Invalid snapshot field '{field}': {value}")]
    InvalidSnapshot {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// Failed to parse a configuration document.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Failed to encode a value to bytes.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A name did not match any known variant.
    #[error("Unknown {kind}: {name}")]
    UnknownVariant {
        /// What was being parsed (e.g. "personality").
        kind: &'static str,
        /// The unrecognised input.
        name: String,
    },
}
