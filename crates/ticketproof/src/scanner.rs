//! Scanner: decode a scanned code, fetch the proof, audit it.

use std::sync::Arc;

use ticketproof_core::ScanCode;
use ticketproof_ledger::Ledger;
use ticketproof_store::{DurableStore, FetchConfig, ProofFetcher};
use tracing::{debug, warn};

use crate::config::{TicketProofConfig, VerifyConfig};
use crate::verifier::{RejectReason, VerificationResult, Verifier};

/// Gate-side flow. Needs no contact with the holder's device.
pub struct Scanner<D: DurableStore, L: Ledger> {
    fetcher: ProofFetcher<D>,
    verifier: Verifier<L>,
}

impl<D: DurableStore, L: Ledger> Scanner<D, L> {
    /// Create a scanner.
    pub fn new(store: Arc<D>, ledger: Arc<L>, fetch: FetchConfig, verify: VerifyConfig) -> Self {
        Self {
            fetcher: ProofFetcher::new(store, fetch),
            verifier: Verifier::new(ledger, verify),
        }
    }

    /// Create a scanner from the top-level configuration.
    pub fn from_config(store: Arc<D>, ledger: Arc<L>, config: &TicketProofConfig) -> Self {
        Self::new(store, ledger, config.fetch.clone(), config.verify.clone())
    }

    /// Scan against the current time.
    pub async fn scan(&self, raw_text: &str) -> VerificationResult {
        self.scan_at(raw_text, crate::now_secs()).await
    }

    /// Scan as of `now` (Unix seconds).
    pub async fn scan_at(&self, raw_text: &str, now: i64) -> VerificationResult {
        let payload = match ScanCode::decode(raw_text) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(error = %e, "scanned text is not a proof payload");
                return VerificationResult::rejected(RejectReason::InvalidPayloadFormat);
            }
        };

        let proof = match self.fetcher.fetch(&payload.blob_id).await {
            Ok(proof) => proof,
            Err(e) => {
                warn!(blob_id = %payload.blob_id, error = %e, "proof could not be fetched");
                return VerificationResult::rejected(RejectReason::ProofUnavailable);
            }
        };

        if proof.ticket_id != payload.ticket_id {
            warn!(
                blob_id = %payload.blob_id,
                payload_ticket = %payload.ticket_id,
                proof_ticket = %proof.ticket_id,
                "payload ticket differs from proof ticket, auditing the proof"
            );
        }

        self.verifier.verify_at(proof, now).await
    }
}
