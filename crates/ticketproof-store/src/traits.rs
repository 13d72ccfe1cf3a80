//! DurableStore trait: the abstract interface to the storage network.
//!
//! The store is content-addressed. Writing is a two-phase sequence
//! (register, upload, certify); reading goes through one of several read
//! paths ("tiers") with different freshness and availability.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use ticketproof_core::{Address, BlobId};

use crate::encoding::EncodedBlob;
use crate::error::Result;

/// A read path into the storage network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadTier {
    /// Caching, load-balanced read service. Fastest, but may lag behind
    /// very recent publishes.
    Aggregator,
    /// The write-path service. Sees fresh blobs sooner, less load-balanced.
    Publisher,
    /// Direct reads from storage nodes over the native protocol. Individual
    /// nodes may be unreachable.
    Direct,
}

impl ReadTier {
    /// Tiers in fallback order.
    pub const ALL: [ReadTier; 3] = [ReadTier::Aggregator, ReadTier::Publisher, ReadTier::Direct];
}

impl fmt::Display for ReadTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReadTier::Aggregator => "aggregator",
            ReadTier::Publisher => "publisher",
            ReadTier::Direct => "direct",
        })
    }
}

/// Intent to store a blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Unencoded blob size in bytes.
    pub size: u64,
    /// Retention period in storage epochs.
    pub retention_epochs: u32,
    /// Account that owns the registration.
    pub owner: Address,
    /// Whether the owner may delete the blob before expiry.
    pub deletable: bool,
    /// File name attached to the blob.
    pub identifier: String,
}

/// Receipt for a recorded registration. Referenced by upload and certify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    /// Ledger digest of the register operation.
    pub digest: String,
    /// Registered blob size.
    pub size: u64,
    /// Registration owner.
    pub owner: Address,
}

/// Acknowledgement of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAck {
    /// Number of chunks stored.
    pub chunks: usize,
}

/// The DurableStore trait: async interface to the storage network.
///
/// # Design Notes
///
/// - `register` and `certify` are ledger-recorded and may require the
///   holder's authorization; refusal is [`StoreError::AuthorizationRejected`].
/// - `upload` before the registration has propagated fails with the
///   transient [`StoreError::RegistrationPending`].
/// - `certify` returns `None` when it completed but yielded no content
///   reference.
///
/// [`StoreError::AuthorizationRejected`]: crate::StoreError::AuthorizationRejected
/// [`StoreError::RegistrationPending`]: crate::StoreError::RegistrationPending
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Declare intent to store a blob.
    async fn register(&self, request: &RegisterRequest) -> Result<RegistrationReceipt>;

    /// Push the encoded blob for a registration.
    async fn upload(&self, receipt: &RegistrationReceipt, blob: &EncodedBlob) -> Result<UploadAck>;

    /// Finalize a registration into a durable, fetchable blob.
    async fn certify(&self, receipt: &RegistrationReceipt) -> Result<Option<BlobId>>;

    /// Read a blob's bytes through one tier.
    async fn fetch(&self, blob_id: &BlobId, tier: ReadTier) -> Result<Bytes>;
}
