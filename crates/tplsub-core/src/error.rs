//! Core error types for tplsub.
//!
//! This module provides the error enum [`TplError`] returned by every template
//! function, coercion, and settings loader. Each function failure maps to
//! exactly one [`ErrorKind`], and the message names the offending argument.

use std::fmt;

use thiserror::Error;

/// The category of a [`TplError`].
///
/// Callers that need to branch on the failure (for example to choose a process
/// exit code) match on this rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value could not be coerced to the required primitive.
    Conversion,
    /// Integer or float division (or remainder) by zero.
    DivisionByZero,
    /// Text did not match a date layout.
    Parse,
    /// A value had the wrong variant for the operation.
    TypeMismatch,
    /// An argument was well-typed but out of range.
    InvalidArgument,
    /// Malformed base64 input.
    Encoding,
    /// A value could not be rendered as JSON.
    Serialization,
    /// No function is registered under the requested name.
    UnknownFunction,
    /// A function was called with the wrong number of arguments.
    ArityMismatch,
    /// Settings could not be loaded.
    Configuration,
    /// An I/O error occurred.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Conversion => "conversion",
            Self::DivisionByZero => "division by zero",
            Self::Parse => "parse",
            Self::TypeMismatch => "type mismatch",
            Self::InvalidArgument => "invalid argument",
            Self::Encoding => "encoding",
            Self::Serialization => "serialization",
            Self::UnknownFunction => "unknown function",
            Self::ArityMismatch => "arity mismatch",
            Self::Configuration => "configuration",
            Self::Io => "io",
        };
        f.write_str(name)
    }
}

/// The primary error type for tplsub.
///
/// The first seven variants are the failures a template function can produce.
/// The rest belong to the registry boundary and to settings loading.
#[derive(Error, Debug)]
pub enum TplError {
    // ── Function failures ────────────────────────────────────────────

    /// A value could not be coerced to an integer, float, or list.
    #[error("Conversion error: {0}")]
    ConversionError(String),

    /// Division or remainder with a zero divisor.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Date text did not match its layout.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A value had the wrong variant for the operation.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// An argument was out of range (negative repeat count, overflow).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed base64 input.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// A value could not be rendered as JSON.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── Registry ─────────────────────────────────────────────────────

    /// No function is registered under this name.
    #[error("Unknown function: '{0}'")]
    UnknownFunction(String),

    /// A function was called with the wrong number of arguments.
    #[error("Function '{name}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// The function name.
        name: String,
        /// A description of the accepted argument count.
        expected: String,
        /// The number of arguments supplied.
        got: usize,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TplError {
    /// Returns the [`ErrorKind`] of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ConversionError(_) => ErrorKind::Conversion,
            Self::DivisionByZero(_) => ErrorKind::DivisionByZero,
            Self::ParseError(_) => ErrorKind::Parse,
            Self::TypeMismatch(_) => ErrorKind::TypeMismatch,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::EncodingError(_) => ErrorKind::Encoding,
            Self::SerializationError(_) => ErrorKind::Serialization,
            Self::UnknownFunction(_) => ErrorKind::UnknownFunction,
            Self::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            Self::ConfigurationError(_) => ErrorKind::Configuration,
            Self::IoError(_) => ErrorKind::Io,
        }
    }

    /// Prefixes the message with context, keeping the kind.
    ///
    /// Used to name the argument position or list index that failed, e.g.
    /// `"first argument: cannot convert 'x' to int"`.
    #[must_use]
    pub fn context(self, ctx: impl fmt::Display) -> Self {
        match self {
            Self::ConversionError(m) => Self::ConversionError(format!("{ctx}: {m}")),
            Self::DivisionByZero(m) => Self::DivisionByZero(format!("{ctx}: {m}")),
            Self::ParseError(m) => Self::ParseError(format!("{ctx}: {m}")),
            Self::TypeMismatch(m) => Self::TypeMismatch(format!("{ctx}: {m}")),
            Self::InvalidArgument(m) => Self::InvalidArgument(format!("{ctx}: {m}")),
            Self::EncodingError(m) => Self::EncodingError(format!("{ctx}: {m}")),
            Self::SerializationError(m) => Self::SerializationError(format!("{ctx}: {m}")),
            Self::ConfigurationError(m) => Self::ConfigurationError(format!("{ctx}: {m}")),
            other => other,
        }
    }
}

/// A convenience type alias for `Result<T, TplError>`.
pub type TplResult<T> = Result<T, TplError>;
