//! Error types for the store module.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use ticketproof_core::{BlobId, CoreError};

use crate::traits::ReadTier;

/// Errors reported by a durable store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The holder declined (or could not give) authorization for a
    /// ledger-recorded step.
    #[error("authorization rejected: {0}")]
    AuthorizationRejected(String),

    /// The registration has not propagated to the storage network yet.
    #[error("registration {0} not yet visible to the storage network")]
    RegistrationPending(String),

    /// Registration unknown to the store.
    #[error("unknown registration: {0}")]
    UnknownRegistration(String),

    /// Uploaded blob does not match what was registered.
    #[error("size mismatch: registered {registered} bytes, uploaded {uploaded}")]
    SizeMismatch { registered: u64, uploaded: u64 },

    /// Certify called before the blob was uploaded.
    #[error("registration {0} has no uploaded blob")]
    NotUploaded(String),

    /// Blob not found on this read path.
    #[error("blob not found: {0}")]
    NotFound(BlobId),

    /// Network-level failure talking to the store.
    #[error("network error: {0}")]
    Network(String),

    /// Invalid data received or stored.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Backend failure that is not expected to clear on retry.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::RegistrationPending(_) | StoreError::Network(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// The steps of a two-phase publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStep {
    Register,
    Upload,
    Certify,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PublishStep::Register => "register",
            PublishStep::Upload => "upload",
            PublishStep::Certify => "certify",
        })
    }
}

/// Errors from publishing a proof.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A step failed fatally.
    #[error("publish failed at {step}: {source}")]
    StepFailed {
        step: PublishStep,
        #[source]
        source: StoreError,
    },

    /// Certify finished without yielding a content reference. Nothing
    /// about this publish may be treated as usable.
    #[error("publish incomplete: certify returned no content reference for registration {registration}")]
    Incomplete { registration: String },

    /// The proof could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] CoreError),
}

impl PublishError {
    /// The failing step, if the failure belongs to one.
    pub fn step(&self) -> Option<PublishStep> {
        match self {
            PublishError::StepFailed { step, .. } => Some(*step),
            PublishError::Incomplete { .. } => Some(PublishStep::Certify),
            PublishError::Encoding(_) => None,
        }
    }

    /// Whether the holder declined authorization.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PublishError::StepFailed {
                source: StoreError::AuthorizationRejected(_),
                ..
            }
        )
    }
}

/// Why a single fetch attempt on one tier failed.
#[derive(Debug)]
pub enum TierFailureReason {
    /// The store returned an error.
    Store(StoreError),
    /// The tier did not answer in time.
    Timeout(Duration),
    /// The tier answered with bytes that are not a proof.
    Undecodable(String),
}

impl fmt::Display for TierFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierFailureReason::Store(e) => write!(f, "{e}"),
            TierFailureReason::Timeout(d) => write!(f, "timed out after {d:?}"),
            TierFailureReason::Undecodable(msg) => write!(f, "undecodable proof: {msg}"),
        }
    }
}

/// One failed attempt in the fetch fallback chain.
#[derive(Debug)]
pub struct TierFailure {
    pub tier: ReadTier,
    pub attempt: u32,
    pub reason: TierFailureReason,
}

impl fmt::Display for TierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (attempt {}): {}", self.tier, self.attempt, self.reason)
    }
}

/// Errors from fetching a proof.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every tier was tried and none produced the proof.
    #[error("proof {blob_id} unavailable: all {} fetch attempts failed", .failures.len())]
    ProofUnavailable {
        blob_id: BlobId,
        failures: Vec<TierFailure>,
    },
}
