//! Two-phase publish of a proof into the durable store.
//!
//! ```text
//! register ──► settle ──► upload (retried) ──► certify ──► BlobId
//! ```
//!
//! `register` and `certify` are ledger-recorded and run exactly once; a
//! refusal there is final. `upload` is retried with exponential backoff
//! while the store reports a transient failure, which covers the window
//! in which the registration has not yet propagated.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ticketproof_core::{BlobId, TicketProof};
use tracing::{debug, info, warn};

use crate::encoding::{EncodedBlob, DEFAULT_CHUNK_SIZE};
use crate::error::{PublishError, PublishStep, StoreError};
use crate::traits::{DurableStore, RegisterRequest, RegistrationReceipt, UploadAck};

/// Configuration for publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Retention period in storage epochs.
    pub retention_epochs: u32,
    /// Whether published blobs may be deleted by their owner.
    pub deletable: bool,
    /// Wait between register and the first upload attempt.
    pub settle_delay: Duration,
    /// Upload attempts before giving up.
    pub max_upload_attempts: u32,
    /// Delay before the first upload retry. Doubles per retry.
    pub backoff_base: Duration,
    /// Upper bound for a single retry delay.
    pub backoff_max: Duration,
    /// Chunk size for blob encoding.
    pub chunk_size: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            retention_epochs: 1,
            deletable: true,
            settle_delay: Duration::from_secs(2),
            max_upload_attempts: 5,
            backoff_base: Duration::from_millis(500),
            backoff_max: Duration::from_secs(8),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl PublishConfig {
    /// Delay before upload retry number `retry` (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedProof {
    /// Content reference of the stored proof.
    pub blob_id: BlobId,
    /// Ledger digest of the registration.
    pub registration: String,
    /// Stored size in bytes.
    pub size: u64,
}

/// File name attached to a proof blob.
pub fn proof_identifier(proof: &TicketProof) -> String {
    format!("ticket_proof_{}.json", proof.ticket_id)
}

/// Publishes proofs through a [`DurableStore`].
pub struct DurablePublisher<D: DurableStore> {
    store: Arc<D>,
    config: PublishConfig,
}

impl<D: DurableStore> DurablePublisher<D> {
    /// Create a publisher.
    pub fn new(store: Arc<D>, config: PublishConfig) -> Self {
        Self { store, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Store a proof durably and return its content reference.
    ///
    /// The registration is owned by the proof's signer, so the claimed
    /// address must parse. On any failure the
    /// error names the step; a registration left behind by a failed upload
    /// or certify is not cleaned up.
    pub async fn publish(&self, proof: &TicketProof) -> Result<PublishedProof, PublishError> {
        let owner = proof.signer_address.to_address()?;
        let bytes = proof.to_json_bytes()?;
        let blob = EncodedBlob::encode(&bytes, self.config.chunk_size);

        let request = RegisterRequest {
            size: blob.size(),
            retention_epochs: self.config.retention_epochs,
            owner,
            deletable: self.config.deletable,
            identifier: proof_identifier(proof),
        };

        let receipt = self
            .store
            .register(&request)
            .await
            .map_err(|source| step_failed(PublishStep::Register, source))?;
        debug!(
            registration = %receipt.digest,
            size = receipt.size,
            "registered proof blob"
        );

        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let ack = self.upload_with_retry(&receipt, &blob).await?;
        debug!(registration = %receipt.digest, chunks = ack.chunks, "uploaded proof blob");

        let blob_id = self
            .store
            .certify(&receipt)
            .await
            .map_err(|source| step_failed(PublishStep::Certify, source))?
            .ok_or_else(|| {
                warn!(registration = %receipt.digest, "certify returned no content reference");
                PublishError::Incomplete {
                    registration: receipt.digest.clone(),
                }
            })?;

        info!(
            blob_id = %blob_id,
            ticket_id = %proof.ticket_id,
            "published proof"
        );

        Ok(PublishedProof {
            blob_id,
            registration: receipt.digest,
            size: blob.size(),
        })
    }

    async fn upload_with_retry(
        &self,
        receipt: &RegistrationReceipt,
        blob: &EncodedBlob,
    ) -> Result<UploadAck, PublishError> {
        let max_attempts = self.config.max_upload_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.store.upload(receipt, blob).await {
                Ok(ack) => return Ok(ack),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        registration = %receipt.digest,
                        attempt,
                        ?delay,
                        error = %e,
                        "upload failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(step_failed(PublishStep::Upload, e)),
            }
        }
    }
}

fn step_failed(step: PublishStep, source: StoreError) -> PublishError {
    warn!(%step, error = %source, "publish step failed");
    PublishError::StepFailed { step, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDurableStore;
    use crate::traits::ReadTier;
    use ticketproof_core::{Keypair, ProofClaim};

    fn proof() -> TicketProof {
        let keypair = Keypair::from_seed(&[0x07; 32]);
        let claim = ProofClaim::new("T1".into(), "E1".into(), 1_700_000_000);
        let signature = keypair.sign_personal_message(&claim.message());
        claim.into_proof(signature, keypair.address())
    }

    fn publisher(store: &Arc<MemoryDurableStore>) -> DurablePublisher<MemoryDurableStore> {
        DurablePublisher::new(Arc::clone(store), PublishConfig::default())
    }

    #[test]
    fn test_backoff_delay() {
        let config = PublishConfig::default();
        assert_eq!(config.backoff_delay(1), Duration::from_millis(500));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(4), Duration::from_secs(4));
        assert_eq!(config.backoff_delay(5), Duration::from_secs(8));
        assert_eq!(config.backoff_delay(40), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_then_fetch_returns_same_proof() {
        let store = Arc::new(MemoryDurableStore::new());
        store.set_propagation_delay(Duration::from_secs(2));
        let proof = proof();

        let published = publisher(&store).publish(&proof).await.unwrap();

        let bytes = store.fetch(&published.blob_id, ReadTier::Direct).await.unwrap();
        assert_eq!(TicketProof::from_json_slice(&bytes).unwrap(), proof);
        assert_eq!(store.upload_attempts(), 1);

        let request = store.registration_request(&published.registration).unwrap();
        assert_eq!(request.owner, proof.signer_address);
        assert_eq!(request.retention_epochs, 1);
        assert!(request.deletable);
        assert_eq!(request.identifier, "ticket_proof_T1.json");
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_retries_until_registration_propagates() {
        let store = Arc::new(MemoryDurableStore::new());
        // Settle delay alone is not enough; two retries (500ms + 1s) are.
        store.set_propagation_delay(Duration::from_millis(3_200));

        let published = publisher(&store).publish(&proof()).await;

        assert!(published.is_ok());
        assert_eq!(store.upload_attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_gives_up_after_max_attempts() {
        let store = Arc::new(MemoryDurableStore::new());
        store.fail_next_uploads(10);

        let err = publisher(&store).publish(&proof()).await.unwrap_err();

        assert_eq!(err.step(), Some(PublishStep::Upload));
        assert_eq!(store.upload_attempts(), 5);
        assert_eq!(store.blob_count(), 0);
        assert_eq!(store.stale_registrations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_rejection_is_not_retried() {
        let store = Arc::new(MemoryDurableStore::new());
        store.reject_register(true);

        let err = publisher(&store).publish(&proof()).await.unwrap_err();

        assert_eq!(err.step(), Some(PublishStep::Register));
        assert!(err.is_rejection());
        assert_eq!(store.upload_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_certify_rejection() {
        let store = Arc::new(MemoryDurableStore::new());
        store.reject_certify(true);

        let err = publisher(&store).publish(&proof()).await.unwrap_err();

        assert_eq!(err.step(), Some(PublishStep::Certify));
        assert!(err.is_rejection());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_reference_is_incomplete() {
        let store = Arc::new(MemoryDurableStore::new());
        store.withhold_reference(true);

        let err = publisher(&store).publish(&proof()).await.unwrap_err();

        assert!(matches!(err, PublishError::Incomplete { .. }));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn test_unparsable_signer_is_not_registered() {
        let store = Arc::new(MemoryDurableStore::new());
        let mut proof = proof();
        proof.signer_address = ticketproof_core::ClaimedAddress::from_text("0xdeadbeef");

        let err = publisher(&store).publish(&proof).await.unwrap_err();

        assert!(matches!(err, PublishError::Encoding(_)));
        assert_eq!(err.step(), None);
        assert_eq!(store.stale_registrations().len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_is_observed() {
        let store = Arc::new(MemoryDurableStore::new());
        let start = tokio::time::Instant::now();

        publisher(&store).publish(&proof()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
