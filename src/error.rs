//! Error types for barforge.
//!
//! Validation problems are reported as [`ValidationFailure`] values so they can
//! travel inside a [`ValidationResult`](crate::validate::ValidationResult) as well
//! as inside [`Error::Validation`]. Everything that goes wrong while drawing is
//! wrapped into [`Error::Render`] with the name of the responsible backend.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for barforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all barforge operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The caller handed in data that cannot be processed at all
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The symbology identifier is not in the type registry
    #[error("unsupported barcode type '{symbology}'. Supported types: {supported}")]
    UnsupportedType {
        /// The identifier that was requested
        symbology: String,
        /// Comma separated list of the registered identifiers
        supported: String,
    },

    /// The output format is not in the format registry
    #[error("unsupported format '{format}'. Supported formats: {supported}")]
    UnsupportedFormat {
        /// The format that was requested
        format: String,
        /// Comma separated list of the registered formats
        supported: String,
    },

    /// The data was rejected by the validator
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// A renderer backend failed
    #[error("{backend} rendering failed: {message}")]
    Render {
        /// Name of the backend that failed (`png`, `svg`, `html`, `pdf`)
        backend: &'static str,
        /// Underlying failure message
        message: String,
    },

    /// Reading or writing a file failed
    #[error("i/o error on '{path}': {source}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Image decoding or encoding failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The base symbol of an advanced composition could not be produced
    #[error("composition failed: {0}")]
    Composition(String),
}

impl Error {
    /// Wraps any displayable failure into a backend tagged render error
    pub fn render(backend: &'static str, source: impl std::fmt::Display) -> Self {
        Self::Render {
            backend,
            message: source.to_string(),
        }
    }

    /// Creates a new I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reasons the validator rejects a piece of data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Empty data
    #[error("data must be a non-empty string")]
    InvalidInput,

    /// Symbology identifier not registered
    #[error("unknown barcode type '{0}'")]
    UnknownType(String),

    /// Data length outside the symbology bounds
    #[error("invalid length {length}: must be between {min} and {max} characters")]
    Length {
        /// Number of characters supplied
        length: usize,
        /// Minimum accepted length
        min: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// Data contains characters the symbology cannot encode
    #[error("{symbology} accepts {charset}")]
    Charset {
        /// Display name of the symbology
        symbology: String,
        /// Description of the accepted characters
        charset: String,
    },

    /// Supplied check digit does not match the computed one
    #[error("invalid check digit: expected {expected}, got {found}")]
    Checksum {
        /// Check digit computed from the payload
        expected: u8,
        /// Check digit found in the data
        found: u8,
    },

    /// Value-level constraint violated (for example a Pharmacode out of range)
    #[error("{0}")]
    Value(String),
}
