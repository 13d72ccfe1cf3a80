//! Error types for issuing proofs.

use std::fmt;

use thiserror::Error;
use ticketproof_core::CoreError;
use ticketproof_store::PublishError;

use crate::signer::SignerError;

/// Errors that can occur while issuing a proof.
///
/// Verification never fails with an error; its outcome is a
/// [`VerificationResult`](crate::VerificationResult).
#[derive(Debug, Error)]
pub enum TicketProofError {
    /// No signing account is available.
    #[error("not authorized: no active signing account")]
    NotAuthorized,

    /// The holder declined to sign.
    #[error("signing rejected by holder")]
    SigningRejected,

    /// The signer could not produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(#[source] SignerError),

    /// A ticket or event identifier is unsafe to sign.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[source] CoreError),

    /// Publishing the signed proof failed.
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    /// The scannable payload could not be produced.
    #[error("codec error: {0}")]
    Codec(#[from] CoreError),
}

/// The stage of issuance an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueStage {
    Assemble,
    Publish,
    Encode,
}

impl fmt::Display for IssueStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IssueStage::Assemble => "assemble",
            IssueStage::Publish => "publish",
            IssueStage::Encode => "encode",
        })
    }
}

impl TicketProofError {
    /// The stage that failed.
    pub fn stage(&self) -> IssueStage {
        match self {
            TicketProofError::NotAuthorized
            | TicketProofError::SigningRejected
            | TicketProofError::SigningFailed(_)
            | TicketProofError::InvalidIdentifier(_) => IssueStage::Assemble,
            TicketProofError::Publish(_) => IssueStage::Publish,
            TicketProofError::Codec(_) => IssueStage::Encode,
        }
    }
}

impl From<SignerError> for TicketProofError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::Rejected => TicketProofError::SigningRejected,
            other => TicketProofError::SigningFailed(other),
        }
    }
}

/// Result type for issuing operations.
pub type Result<T> = std::result::Result<T, TicketProofError>;
