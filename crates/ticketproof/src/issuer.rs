//! Issuer: assemble, publish and encode a proof in one call.

use std::sync::Arc;

use ticketproof_core::{BlobId, CompactPayload, EventId, ScanCode, TicketId, TicketProof};
use ticketproof_store::{DurablePublisher, DurableStore, PublishConfig};
use tracing::info;

use crate::assembler::ProofAssembler;
use crate::error::Result;
use crate::signer::Signer;

/// Everything produced by issuing a proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedProof {
    /// The signed proof as stored.
    pub proof: TicketProof,
    /// Where the proof is stored.
    pub blob_id: BlobId,
    /// The pointer embedded in the scannable code.
    pub payload: CompactPayload,
    /// Text and error-correction level for rendering.
    pub code: ScanCode,
}

/// Holder-side flow: sign, store durably, produce the scannable code.
pub struct Issuer<G: Signer, D: DurableStore> {
    assembler: ProofAssembler<G>,
    publisher: DurablePublisher<D>,
}

impl<G: Signer, D: DurableStore> Issuer<G, D> {
    /// Create an issuer.
    pub fn new(signer: Arc<G>, store: Arc<D>, config: PublishConfig) -> Self {
        Self {
            assembler: ProofAssembler::new(signer),
            publisher: DurablePublisher::new(store, config),
        }
    }

    /// Issue a proof timestamped now.
    pub async fn issue(&self, ticket_id: TicketId, event_id: EventId) -> Result<IssuedProof> {
        self.issue_at(ticket_id, event_id, crate::now_secs()).await
    }

    /// Issue a proof with a caller-supplied timestamp (Unix seconds).
    ///
    /// On error, [`TicketProofError::stage`](crate::TicketProofError::stage)
    /// names the stage that failed.
    pub async fn issue_at(
        &self,
        ticket_id: TicketId,
        event_id: EventId,
        timestamp: i64,
    ) -> Result<IssuedProof> {
        let proof = self.assembler.assemble_at(ticket_id, event_id, timestamp).await?;
        let published = self.publisher.publish(&proof).await?;

        let code = ScanCode::encode(&published.blob_id, &proof.ticket_id)?;
        let payload = CompactPayload::new(published.blob_id.clone(), proof.ticket_id.clone());

        info!(
            ticket_id = %proof.ticket_id,
            blob_id = %published.blob_id,
            error_correction = ?code.error_correction,
            "issued proof"
        );

        Ok(IssuedProof {
            proof,
            blob_id: published.blob_id,
            payload,
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IssueStage, TicketProofError};
    use crate::signer::KeypairSigner;
    use ticketproof_core::{ErrorCorrection, Keypair};
    use ticketproof_store::{MemoryDurableStore, PublishStep};

    fn issuer() -> (
        Arc<KeypairSigner>,
        Arc<MemoryDurableStore>,
        Issuer<KeypairSigner, MemoryDurableStore>,
    ) {
        let signer = Arc::new(KeypairSigner::new(Keypair::from_seed(&[0x51; 32])));
        let store = Arc::new(MemoryDurableStore::new());
        let issuer = Issuer::new(Arc::clone(&signer), Arc::clone(&store), PublishConfig::default());
        (signer, store, issuer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_issue() {
        let (signer, store, issuer) = issuer();

        let issued = issuer.issue_at("T1".into(), "E1".into(), 1_736_870_400).await.unwrap();

        assert_eq!(issued.proof.signer_address, signer.address());
        assert_eq!(issued.payload.blob_id, issued.blob_id);
        assert_eq!(ScanCode::decode(&issued.code.text).unwrap(), issued.payload);
        assert_eq!(issued.code.error_correction, ErrorCorrection::High);
        assert_eq!(store.blob_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signing_failure_publishes_nothing() {
        let (signer, store, issuer) = issuer();
        signer.set_declining(true);

        let err = issuer.issue("T1".into(), "E1".into()).await.unwrap_err();

        assert_eq!(err.stage(), IssueStage::Assemble);
        assert!(store.stale_registrations().is_empty());
        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_failure_names_step() {
        let (_, store, issuer) = issuer();
        store.reject_certify(true);

        let err = issuer.issue("T1".into(), "E1".into()).await.unwrap_err();

        assert_eq!(err.stage(), IssueStage::Publish);
        match err {
            TicketProofError::Publish(e) => assert_eq!(e.step(), Some(PublishStep::Certify)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
