//! Proof Assembler: build and sign a ticket proof on the holder's device.

use std::sync::Arc;

use ticketproof_core::{EventId, ProofClaim, TicketId, TicketProof};
use tracing::{debug, info, warn};

use crate::error::{Result, TicketProofError};
use crate::signer::Signer;

/// Builds signed proofs with an injected [`Signer`].
pub struct ProofAssembler<G: Signer> {
    signer: Arc<G>,
}

impl<G: Signer> ProofAssembler<G> {
    /// Create an assembler.
    pub fn new(signer: Arc<G>) -> Self {
        Self { signer }
    }

    /// Build and sign a proof timestamped now.
    pub async fn assemble(&self, ticket_id: TicketId, event_id: EventId) -> Result<TicketProof> {
        self.assemble_at(ticket_id, event_id, crate::now_secs()).await
    }

    /// Build and sign a proof with a caller-supplied timestamp (Unix seconds).
    ///
    /// Suspends until the holder answers the signature request.
    pub async fn assemble_at(
        &self,
        ticket_id: TicketId,
        event_id: EventId,
        timestamp: i64,
    ) -> Result<TicketProof> {
        let claim = ProofClaim::new(ticket_id, event_id, timestamp);
        claim.validate().map_err(TicketProofError::InvalidIdentifier)?;

        let account = self
            .signer
            .active_account()
            .await
            .ok_or(TicketProofError::NotAuthorized)?;

        debug!(
            ticket_id = %claim.ticket_id,
            event_id = %claim.event_id,
            timestamp,
            %account,
            "requesting proof signature"
        );

        let signature = self
            .signer
            .sign(&claim.message(), &account)
            .await
            .map_err(|e| {
                warn!(ticket_id = %claim.ticket_id, error = %e, "proof signature not obtained");
                TicketProofError::from(e)
            })?;

        info!(ticket_id = %claim.ticket_id, %account, "assembled proof");
        Ok(claim.into_proof(signature, account))
    }
}
