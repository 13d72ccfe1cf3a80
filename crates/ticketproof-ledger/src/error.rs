//! Error types for ledger queries.

use std::time::Duration;

use thiserror::Error;
use ticketproof_core::ContainerId;

/// Errors that can occur while querying the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger could not be reached or answered with an error.
    #[error("ledger transport error: {0}")]
    Transport(String),

    /// The ledger did not answer in time.
    #[error("ledger query timed out after {0:?}")]
    Timeout(Duration),

    /// Container unknown to the ledger.
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerId),

    /// Lock poisoned or similar local failure.
    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
