//! Error types for symbol queries.

use thiserror::Error;

use crate::oracle::OracleError;

/// Errors that can occur while evaluating a wrapped symbol.
///
/// Sentinels (error types, absent locations) are ordinary values and never
/// show up here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SymbolError {
    /// The oracle returned a shape outside the closed set handled here.
    /// Usually a front-end/version mismatch.
    #[error("internal consistency violation in {context}: expected {expected}, found {actual}")]
    InternalConsistency {
        context: String,
        expected: &'static str,
        actual: String,
    },

    /// A query that is deliberately left unimplemented.
    #[error("not yet implemented: {0}")]
    NotImplemented(&'static str),

    /// A handle that was not issued by this session.
    #[error("stale {kind} handle #{index}")]
    StaleHandle { kind: &'static str, index: usize },

    /// The oracle itself failed.
    #[error("oracle query failed: {0}")]
    Oracle(#[from] OracleError),
}

impl SymbolError {
    /// Create an internal consistency error and log it.
    pub fn inconsistency(
        context: impl Into<String>,
        expected: &'static str,
        actual: impl Into<String>,
    ) -> Self {
        let context = context.into();
        let actual = actual.into();
        tracing::warn!(%context, expected, %actual, "internal consistency violation");
        Self::InternalConsistency {
            context,
            expected,
            actual,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, SymbolError::InternalConsistency { .. })
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, SymbolError::NotImplemented(_))
    }
}

pub type SymbolResult<T> = Result<T, SymbolError>;
