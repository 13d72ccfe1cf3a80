//! Tiered retrieval of proofs from the durable store.
//!
//! Tiers are tried in [`ReadTier::ALL`] order, each under its own timeout.
//! The first tier that answers with a decodable proof wins; failures are
//! collected so the caller can see why every tier was skipped.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ticketproof_core::{BlobId, TicketProof};
use tracing::{debug, warn};

use crate::error::{FetchError, TierFailure, TierFailureReason};
use crate::traits::{DurableStore, ReadTier};

/// Configuration for fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Timeout for one aggregator read.
    pub aggregator_timeout: Duration,
    /// Timeout for one publisher read.
    pub publisher_timeout: Duration,
    /// Timeout for one direct read.
    pub direct_timeout: Duration,
    /// Attempts per tier before moving to the next.
    pub attempts_per_tier: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            aggregator_timeout: Duration::from_secs(10),
            publisher_timeout: Duration::from_secs(10),
            direct_timeout: Duration::from_secs(5),
            attempts_per_tier: 1,
        }
    }
}

impl FetchConfig {
    /// Timeout for a single read on `tier`.
    pub fn timeout_for(&self, tier: ReadTier) -> Duration {
        match tier {
            ReadTier::Aggregator => self.aggregator_timeout,
            ReadTier::Publisher => self.publisher_timeout,
            ReadTier::Direct => self.direct_timeout,
        }
    }
}

/// Fetches proofs through a [`DurableStore`].
pub struct ProofFetcher<D: DurableStore> {
    store: Arc<D>,
    config: FetchConfig,
}

impl<D: DurableStore> ProofFetcher<D> {
    /// Create a fetcher.
    pub fn new(store: Arc<D>, config: FetchConfig) -> Self {
        Self { store, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Retrieve and decode the proof stored under `blob_id`.
    pub async fn fetch(&self, blob_id: &BlobId) -> Result<TicketProof, FetchError> {
        let mut failures = Vec::new();
        let attempts = self.config.attempts_per_tier.max(1);

        for tier in ReadTier::ALL {
            let timeout = self.config.timeout_for(tier);

            for attempt in 1..=attempts {
                match self.fetch_once(blob_id, tier, timeout).await {
                    Ok(proof) => {
                        debug!(blob_id = %blob_id, %tier, attempt, "fetched proof");
                        return Ok(proof);
                    }
                    Err(reason) => {
                        warn!(
                            blob_id = %blob_id,
                            %tier,
                            attempt,
                            reason = %reason,
                            "fetch attempt failed"
                        );
                        failures.push(TierFailure {
                            tier,
                            attempt,
                            reason,
                        });
                    }
                }
            }
        }

        Err(FetchError::ProofUnavailable {
            blob_id: blob_id.clone(),
            failures,
        })
    }

    async fn fetch_once(
        &self,
        blob_id: &BlobId,
        tier: ReadTier,
        timeout: Duration,
    ) -> Result<TicketProof, TierFailureReason> {
        let bytes = tokio::time::timeout(timeout, self.store.fetch(blob_id, tier))
            .await
            .map_err(|_| TierFailureReason::Timeout(timeout))?
            .map_err(TierFailureReason::Store)?;

        TicketProof::from_json_slice(&bytes)
            .map_err(|e| TierFailureReason::Undecodable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDurableStore, TierFault};
    use ticketproof_core::{Keypair, ProofClaim};

    fn stored_proof(store: &MemoryDurableStore) -> (BlobId, TicketProof) {
        let keypair = Keypair::from_seed(&[0x09; 32]);
        let claim = ProofClaim::new("T1".into(), "E1".into(), 1_700_000_000);
        let signature = keypair.sign_personal_message(&claim.message());
        let proof = claim.into_proof(signature, keypair.address());

        let blob_id = BlobId::from("R");
        store
            .insert_blob(blob_id.clone(), proof.to_json_bytes().unwrap())
            .unwrap();
        (blob_id, proof)
    }

    fn fetcher(store: &Arc<MemoryDurableStore>) -> ProofFetcher<MemoryDurableStore> {
        ProofFetcher::new(Arc::clone(store), FetchConfig::default())
    }

    #[tokio::test]
    async fn test_first_tier_wins() {
        let store = Arc::new(MemoryDurableStore::new());
        let (blob_id, proof) = stored_proof(&store);

        assert_eq!(fetcher(&store).fetch(&blob_id).await.unwrap(), proof);
        assert_eq!(store.fetch_attempts(ReadTier::Aggregator), 1);
        assert_eq!(store.fetch_attempts(ReadTier::Publisher), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_past_down_and_hung_tiers() {
        let store = Arc::new(MemoryDurableStore::new());
        let (blob_id, proof) = stored_proof(&store);
        store.set_tier_fault(ReadTier::Aggregator, Some(TierFault::Hang));
        store.set_tier_fault(ReadTier::Publisher, Some(TierFault::Down));

        let start = tokio::time::Instant::now();
        let fetched = fetcher(&store).fetch(&blob_id).await.unwrap();

        assert_eq!(fetched, proof);
        assert_eq!(store.fetch_attempts(ReadTier::Direct), 1);
        // Only the aggregator timeout was spent.
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test]
    async fn test_undecodable_answer_moves_on() {
        let store = Arc::new(MemoryDurableStore::new());
        let (blob_id, proof) = stored_proof(&store);
        store.set_tier_fault(ReadTier::Aggregator, Some(TierFault::Corrupt));

        assert_eq!(fetcher(&store).fetch(&blob_id).await.unwrap(), proof);
        assert_eq!(store.fetch_attempts(ReadTier::Publisher), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_tiers_fail() {
        let store = Arc::new(MemoryDurableStore::new());
        store.set_tier_fault(ReadTier::Direct, Some(TierFault::Hang));

        let err = fetcher(&store).fetch(&"missing".into()).await.unwrap_err();

        let FetchError::ProofUnavailable { failures, .. } = err;
        let tiers: Vec<_> = failures.iter().map(|f| f.tier).collect();
        assert_eq!(tiers, ReadTier::ALL.to_vec());
        assert!(matches!(
            failures[2].reason,
            TierFailureReason::Timeout(d) if d == Duration::from_secs(5)
        ));
    }

    #[tokio::test]
    async fn test_attempts_per_tier() {
        let store = Arc::new(MemoryDurableStore::new());
        let config = FetchConfig {
            attempts_per_tier: 2,
            ..FetchConfig::default()
        };
        let fetcher = ProofFetcher::new(Arc::clone(&store), config);

        let err = fetcher.fetch(&"missing".into()).await.unwrap_err();

        let FetchError::ProofUnavailable { failures, .. } = err;
        assert_eq!(failures.len(), 6);
        assert_eq!(store.fetch_attempts(ReadTier::Publisher), 2);
    }
}
