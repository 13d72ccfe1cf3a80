//! # Ticket Proof Store
//!
//! Durable-store abstraction for ticket proofs. Provides a trait-based
//! interface to a content-addressed storage network, the two-phase
//! publisher that writes proofs into it, and the tiered fetcher that reads
//! them back.
//!
//! ## Overview
//!
//! The storage network itself is external. This crate only drives it
//! through the [`DurableStore`] trait, so the publish and fetch protocols
//! can be exercised against [`MemoryDurableStore`] in tests.
//!
//! ## Key Types
//!
//! - [`DurableStore`] - The async trait for the storage network
//! - [`DurablePublisher`] - Register → upload → certify, with retries
//! - [`ProofFetcher`] - Aggregator → publisher → direct fallback chain
//! - [`EncodedBlob`] - A chunked, digest-rooted blob ready for upload
//! - [`MemoryDurableStore`] - In-memory store with fault injection
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ticketproof_store::{
//!     DurablePublisher, FetchConfig, MemoryDurableStore, ProofFetcher, PublishConfig,
//! };
//!
//! async fn example() {
//!     let store = Arc::new(MemoryDurableStore::new());
//!
//!     let publisher = DurablePublisher::new(Arc::clone(&store), PublishConfig::default());
//!     let fetcher = ProofFetcher::new(store, FetchConfig::default());
//!
//!     // let published = publisher.publish(&proof).await.unwrap();
//!     // let proof = fetcher.fetch(&published.blob_id).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Named steps**: every publish failure says which step failed
//! - **Bounded retries**: only uploads are retried, with exponential backoff
//! - **Per-tier timeouts**: a hung tier never blocks the next one

pub mod encoding;
pub mod error;
pub mod fetcher;
pub mod memory;
pub mod publisher;
pub mod traits;

pub use encoding::{EncodedBlob, DEFAULT_CHUNK_SIZE};
pub use error::{
    FetchError, PublishError, PublishStep, Result, StoreError, TierFailure, TierFailureReason,
};
pub use fetcher::{FetchConfig, ProofFetcher};
pub use memory::{MemoryDurableStore, TierFault};
pub use publisher::{proof_identifier, DurablePublisher, PublishConfig, PublishedProof};
pub use traits::{DurableStore, ReadTier, RegisterRequest, RegistrationReceipt, UploadAck};
