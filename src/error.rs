//! Error types and handling infrastructure for rlpager.
//!
//! Library errors use `thiserror`; the binary entry point wraps them with
//! `anyhow` for context. The taxonomy is deliberately small:
//!
//! - [`PagerError::OutOfRange`] is recoverable: the requested lines have not
//!   arrived yet and the caller should re-validate against the latest length.
//! - [`PagerError::InvalidPattern`] is recoverable and surfaced inline; the
//!   previously valid search highlight stays untouched.
//! - Programming faults (a lock range whose end precedes its start, an
//!   invariant breach inside the store) panic at the call site instead of
//!   returning an error. They are bugs, not conditions to handle.
//!
//! An exhausted search is not an error at all; it is the `NotFound` pager
//! mode.

use thiserror::Error;

/// The main error type for rlpager operations.
#[derive(Error, Debug)]
pub enum PagerError {
    /// A requested line index is at or beyond the current store length.
    ///
    /// Under a still-growing stream this means "not yet available", not
    /// corruption. Callers retry after the next growth notification.
    #[error("line {requested} is beyond the current length {length}")]
    OutOfRange { requested: usize, length: usize },

    /// The search pattern failed to compile.
    #[error("invalid search pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// IO failure while reading the input stream.
    #[error("read from input failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Terminal backend failures (raw mode, drawing, event polling).
    #[error("terminal operation failed: {message}")]
    Terminal { message: String },
}

/// Standard Result type for rlpager operations.
pub type Result<T> = std::result::Result<T, PagerError>;

impl PagerError {
    /// Create an InvalidPattern error for a pattern that failed to compile.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an Io error with additional context.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a Terminal error with a descriptive message.
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PagerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "IO operation failed".to_string(),
            source: err,
        }
    }
}
