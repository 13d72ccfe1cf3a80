//! # Ticket Proof
//!
//! Proof of ticket possession that a holder produces once and a gate
//! verifies later, without the holder's device being online.
//!
//! ## Overview
//!
//! Issuing happens on the holder's device:
//!
//! - **Assemble**: sign a canonical check-in message with the holder's key
//! - **Publish**: store the signed proof in a content-addressed durable store
//! - **Encode**: embed the store reference in a small scannable payload
//!
//! Scanning happens at the gate:
//!
//! - **Decode** the payload, **fetch** the proof through the read tiers
//! - **Verify**: freshness, then signature, then ledger ownership
//!
//! ## Key Concepts
//!
//! - **Proof**: Immutable. Signed once, stored once, only read afterwards.
//! - **Payload**: Carries no authority. All trust comes from the fetched proof.
//! - **Ownership**: Checked live against the ledger at every scan.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ticketproof::{Issuer, KeypairSigner, Scanner, TicketProofConfig};
//! use ticketproof::core::Keypair;
//! use ticketproof::ledger::MemoryLedger;
//! use ticketproof::store::MemoryDurableStore;
//!
//! async fn example() {
//!     let config = TicketProofConfig::default();
//!     let store = Arc::new(MemoryDurableStore::new());
//!     let ledger = Arc::new(MemoryLedger::new());
//!     let signer = Arc::new(KeypairSigner::new(Keypair::generate()));
//!
//!     // Holder side
//!     let issuer = Issuer::new(signer, Arc::clone(&store), config.publish.clone());
//!     let issued = issuer.issue("T1".into(), "E1".into()).await.unwrap();
//!
//!     // Gate side
//!     let scanner = Scanner::from_config(store, ledger, &config);
//!     let result = scanner.scan(&issued.code.text).await;
//!     println!("accepted: {}", result.accepted);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ticketproof::core` - Proof model, canonical message, crypto, codec
//! - `ticketproof::store` - Durable store, publisher, fetcher
//! - `ticketproof::ledger` - Ledger and ownership check

pub mod assembler;
pub mod config;
pub mod error;
pub mod issuer;
pub mod scanner;
pub mod signer;
pub mod verifier;

// Re-export component crates
pub use ticketproof_core as core;
pub use ticketproof_ledger as ledger;
pub use ticketproof_store as store;

// Re-export main types for convenience
pub use assembler::ProofAssembler;
pub use config::{TicketProofConfig, VerifyConfig};
pub use error::{IssueStage, Result, TicketProofError};
pub use issuer::{IssuedProof, Issuer};
pub use scanner::Scanner;
pub use signer::{KeypairSigner, Signer, SignerError};
pub use verifier::{ForgeryKind, RejectReason, VerificationResult, Verifier};

pub use ticketproof_core::{
    Address, BlobId, CompactPayload, ErrorCorrection, EventId, ScanCode, TicketId, TicketProof,
};

/// Current time in Unix seconds.
pub(crate) fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
