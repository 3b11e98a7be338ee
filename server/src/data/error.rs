//! Unified error type for the data layer
//!
//! Every tabular store call resolves to one of these variants. Callers above
//! the search service never see them as faults: they are logged and turned
//! into an empty result plus a warning.

use std::time::Duration;

use thiserror::Error;

/// Error type for tabular store operations
#[derive(Error, Debug)]
pub enum DataError {
    /// Connection could not be established or the pool is gone
    #[error("Store {backend} is not available: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    /// A statement was rejected by the store (bad cast, missing table/column)
    #[error("Query failed on {backend}: {source}")]
    Query {
        backend: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Store call exceeded the configured timeout
    #[error("Query timeout after {timeout:?} on {backend}")]
    Timeout {
        backend: &'static str,
        timeout: Duration,
    },
}

impl DataError {
    /// Classify a sqlx error from the given backend
    ///
    /// Pool and IO failures mean the store is unreachable; everything else is
    /// a failure of the statement itself.
    pub fn from_sqlx(backend: &'static str, e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::Unavailable {
                backend,
                reason: e.to_string(),
            },
            other => Self::Query {
                backend,
                source: other,
            },
        }
    }

    /// Create a timeout error
    pub fn timeout(backend: &'static str, timeout: Duration) -> Self {
        Self::Timeout {
            backend,
            timeout,
        }
    }

    /// Create a store unavailable error
    pub fn unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// True when the store itself could not be reached (including timeouts)
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Unavailable { backend, .. } => backend,
            Self::Query { backend, .. } => backend,
            Self::Timeout { backend, .. } => backend,
        }
    }
}
