//! Library error types.
//!
//! Unknown or indeterminate *results* are never errors here; they are
//! data, carried as epistemic states through the algebra. These types
//! cover the boundary where raw user input enters the engine.

use thiserror::Error;

/// A raw answer that could not be turned into a fact value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The raw text does not parse as the expected answer kind.
    #[error("cannot read {raw:?} as a {kind} answer")]
    Answer {
        /// The expected variant kind.
        kind: &'static str,
        /// The offending input.
        raw: String,
    },

    /// A timeline literal was structurally malformed.
    #[error("malformed timeline literal {raw:?}: {reason}")]
    TimelineLiteral {
        /// The offending input.
        raw: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A breakpoint key did not parse as `Dawn` or a calendar date.
    #[error("cannot read {raw:?} as a timeline breakpoint")]
    Breakpoint {
        /// The offending key text.
        raw: String,
    },
}

/// Top-level library error.
#[derive(Debug, Error)]
pub enum ThemisError {
    /// An answer failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Convenience alias for fallible library operations.
pub type Result<T> = std::result::Result<T, ThemisError>;
