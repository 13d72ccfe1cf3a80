//! Verifier: the scanner-side audit of a fetched proof.
//!
//! Three checks run in a fixed order, and the first failure decides the
//! outcome:
//!
//! 1. **Freshness** - the proof's timestamp lies within the window of now,
//!    in either direction.
//! 2. **Authenticity** - the signature verifies over the canonical message
//!    and was produced by `signer_address`.
//! 3. **Ownership** - the ledger shows `signer_address` holding the ticket
//!    in one of its containers.
//!
//! Nothing is cached between verifications; each call queries the ledger.

use std::fmt;
use std::sync::Arc;

use ticketproof_core::{Address, CoreError, TicketProof};
use ticketproof_ledger::{holds_ticket_within, Ledger};
use tracing::{debug, info, warn};

use crate::config::VerifyConfig;

/// Why a proof's signature was judged forged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForgeryKind {
    /// An identifier could make the canonical message ambiguous.
    UnsafeIdentifier,
    /// The serialized signature could not be parsed.
    MalformedSignature,
    /// The signature does not verify over the canonical message.
    BadSignature,
    /// The signature verifies, but the claimed address is not the
    /// signer's, either another account or not an address at all.
    SignerMismatch,
}

impl fmt::Display for ForgeryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ForgeryKind::UnsafeIdentifier => "unsafe identifier",
            ForgeryKind::MalformedSignature => "malformed signature",
            ForgeryKind::BadSignature => "bad signature",
            ForgeryKind::SignerMismatch => "signer mismatch",
        })
    }
}

/// Why a scan was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The scanned text is not a valid compact payload.
    InvalidPayloadFormat,
    /// No read tier produced the proof.
    ProofUnavailable,
    /// The timestamp is outside the freshness window. `age` is negative
    /// for a proof dated in the future.
    ProofExpired { age: i64 },
    /// The signature does not bind `signer_address` to the claim.
    ProofForged(ForgeryKind),
    /// The signer does not hold the ticket.
    ProofNotOwned,
    /// Ownership could not be determined.
    LedgerUnavailable,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidPayloadFormat => f.write_str("invalid payload format"),
            RejectReason::ProofUnavailable => f.write_str("proof unavailable"),
            RejectReason::ProofExpired { age } => write!(f, "proof expired (age {age}s)"),
            RejectReason::ProofForged(kind) => write!(f, "proof forged: {kind}"),
            RejectReason::ProofNotOwned => f.write_str("proof not owned"),
            RejectReason::LedgerUnavailable => f.write_str("ledger unavailable"),
        }
    }
}

/// Outcome of a verification.
///
/// Accepted results carry the proof unchanged; rejected results carry only
/// the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub accepted: bool,
    pub proof: Option<TicketProof>,
    pub reason: Option<RejectReason>,
}

impl VerificationResult {
    /// An accepted proof.
    pub fn accepted(proof: TicketProof) -> Self {
        Self {
            accepted: true,
            proof: Some(proof),
            reason: None,
        }
    }

    /// A rejection.
    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            accepted: false,
            proof: None,
            reason: Some(reason),
        }
    }
}

/// Audits proofs against a [`Ledger`].
pub struct Verifier<L: Ledger> {
    ledger: Arc<L>,
    config: VerifyConfig,
}

impl<L: Ledger> Verifier<L> {
    /// Create a verifier.
    pub fn new(ledger: Arc<L>, config: VerifyConfig) -> Self {
        Self { ledger, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Audit a proof against the current time.
    pub async fn verify(&self, proof: TicketProof) -> VerificationResult {
        self.verify_at(proof, crate::now_secs()).await
    }

    /// Audit a proof as of `now` (Unix seconds).
    pub async fn verify_at(&self, proof: TicketProof, now: i64) -> VerificationResult {
        match self.audit(&proof, now).await {
            Ok(()) => {
                info!(
                    ticket_id = %proof.ticket_id,
                    signer = %proof.signer_address,
                    "proof accepted"
                );
                VerificationResult::accepted(proof)
            }
            Err(reason) => {
                info!(ticket_id = %proof.ticket_id, %reason, "proof rejected");
                VerificationResult::rejected(reason)
            }
        }
    }

    async fn audit(&self, proof: &TicketProof, now: i64) -> Result<(), RejectReason> {
        self.check_freshness(proof, now)?;
        let signer = check_authenticity(proof)?;
        self.check_ownership(proof, &signer).await
    }

    fn check_freshness(&self, proof: &TicketProof, now: i64) -> Result<(), RejectReason> {
        let age = proof.age_at(now);
        let window = self.config.freshness_window.as_secs();

        if age.unsigned_abs() > window {
            debug!(ticket_id = %proof.ticket_id, age, window, "freshness check failed");
            return Err(RejectReason::ProofExpired { age });
        }

        debug!(ticket_id = %proof.ticket_id, age, "freshness check passed");
        Ok(())
    }

    async fn check_ownership(
        &self,
        proof: &TicketProof,
        signer: &Address,
    ) -> Result<(), RejectReason> {
        let timeout = self.config.ledger_timeout;

        match holds_ticket_within(&*self.ledger, signer, &proof.ticket_id, timeout).await {
            Ok(true) => {
                debug!(ticket_id = %proof.ticket_id, "ownership check passed");
                Ok(())
            }
            Ok(false) => {
                debug!(ticket_id = %proof.ticket_id, %signer, "ticket not held by signer");
                Err(RejectReason::ProofNotOwned)
            }
            Err(e) => {
                warn!(ticket_id = %proof.ticket_id, error = %e, "ledger query failed");
                Err(RejectReason::LedgerUnavailable)
            }
        }
    }
}

/// Recover the signer and check it is exactly the claimed address.
///
/// The claim is compared as text against the canonical rendering of the
/// recovered address, so a claim in any other form is a mismatch.
fn check_authenticity(proof: &TicketProof) -> Result<Address, RejectReason> {
    let recovered = proof.recover_signer().map_err(|e| {
        debug!(ticket_id = %proof.ticket_id, error = %e, "signature check failed");
        RejectReason::ProofForged(forgery_kind(&e))
    })?;

    if !proof.signer_address.matches(&recovered) {
        debug!(
            ticket_id = %proof.ticket_id,
            claimed = %proof.signer_address,
            %recovered,
            "signature does not match claimed signer"
        );
        return Err(RejectReason::ProofForged(ForgeryKind::SignerMismatch));
    }

    debug!(ticket_id = %proof.ticket_id, "authenticity check passed");
    Ok(recovered)
}

fn forgery_kind(err: &CoreError) -> ForgeryKind {
    match err {
        CoreError::InvalidIdentifier { .. } => ForgeryKind::UnsafeIdentifier,
        CoreError::InvalidSignature => ForgeryKind::BadSignature,
        _ => ForgeryKind::MalformedSignature,
    }
}
