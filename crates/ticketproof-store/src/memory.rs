//! In-memory implementation of the DurableStore trait.
//!
//! This is primarily for testing. It follows the same protocol as a real
//! storage network (registrations must propagate before upload, certified
//! blobs reach the aggregator after a lag) and lets tests inject the
//! failures the publisher and fetcher have to survive.
//!
//! Timing uses `tokio::time`, so tests running with a paused clock see
//! propagation delays and hung tiers resolve instantly.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;
use ticketproof_core::BlobId;

use crate::encoding::EncodedBlob;
use crate::error::{Result, StoreError};
use crate::traits::{DurableStore, ReadTier, RegisterRequest, RegistrationReceipt, UploadAck};

/// How long a hung tier stalls before answering.
const HANG_DURATION: Duration = Duration::from_secs(3600);

/// Injected misbehavior for one read tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierFault {
    /// Fails immediately with a network error.
    Down,
    /// Never answers within any reasonable timeout.
    Hang,
    /// Answers with bytes that are not a proof.
    Corrupt,
}

/// In-memory durable store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryDurableStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Registrations indexed by digest.
    registrations: HashMap<String, Registration>,

    /// Certified blobs.
    blobs: HashMap<BlobId, StoredBlob>,

    /// Counter for registration digests.
    next_registration: u64,

    /// Injected behavior.
    behavior: Behavior,

    /// Observed calls.
    stats: Stats,
}

struct Registration {
    request: RegisterRequest,
    registered_at: Instant,
    uploaded: Option<EncodedBlob>,
    certified: Option<BlobId>,
}

struct StoredBlob {
    bytes: Bytes,
    certified_at: Instant,
}

#[derive(Default)]
struct Behavior {
    propagation_delay: Duration,
    aggregator_lag: Duration,
    reject_register: bool,
    reject_certify: bool,
    withhold_reference: bool,
    failing_uploads: u32,
    tier_faults: HashMap<ReadTier, TierFault>,
}

#[derive(Default)]
struct Stats {
    upload_attempts: u32,
    fetch_attempts: HashMap<ReadTier, u32>,
}

impl MemoryDurableStore {
    /// Create a new empty store that behaves perfectly.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                registrations: HashMap::new(),
                blobs: HashMap::new(),
                next_registration: 1,
                behavior: Behavior::default(),
                stats: Stats::default(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn configure(&self, f: impl FnOnce(&mut Behavior)) {
        if let Ok(mut inner) = self.inner.write() {
            f(&mut inner.behavior);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fault injection
    // ─────────────────────────────────────────────────────────────────────────

    /// Time a registration needs before uploads referencing it succeed.
    pub fn set_propagation_delay(&self, delay: Duration) {
        self.configure(|b| b.propagation_delay = delay);
    }

    /// Time a certified blob needs before the aggregator serves it.
    pub fn set_aggregator_lag(&self, lag: Duration) {
        self.configure(|b| b.aggregator_lag = lag);
    }

    /// Make the holder decline the register step.
    pub fn reject_register(&self, reject: bool) {
        self.configure(|b| b.reject_register = reject);
    }

    /// Make the holder decline the certify step.
    pub fn reject_certify(&self, reject: bool) {
        self.configure(|b| b.reject_certify = reject);
    }

    /// Make certify complete without returning a content reference.
    pub fn withhold_reference(&self, withhold: bool) {
        self.configure(|b| b.withhold_reference = withhold);
    }

    /// Fail the next `count` uploads with a network error.
    pub fn fail_next_uploads(&self, count: u32) {
        self.configure(|b| b.failing_uploads = count);
    }

    /// Inject (or clear) a fault on one read tier.
    pub fn set_tier_fault(&self, tier: ReadTier, fault: Option<TierFault>) {
        self.configure(|b| match fault {
            Some(fault) => {
                b.tier_faults.insert(tier, fault);
            }
            None => {
                b.tier_faults.remove(&tier);
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    /// Store bytes directly as a certified blob, bypassing the publish flow.
    pub fn insert_blob(&self, blob_id: BlobId, bytes: impl Into<Bytes>) -> Result<()> {
        let mut inner = self.write()?;
        inner.blobs.insert(
            blob_id,
            StoredBlob {
                bytes: bytes.into(),
                certified_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Number of upload calls seen, successful or not.
    pub fn upload_attempts(&self) -> u32 {
        self.read().map(|i| i.stats.upload_attempts).unwrap_or(0)
    }

    /// Number of fetch calls seen on a tier.
    pub fn fetch_attempts(&self, tier: ReadTier) -> u32 {
        self.read()
            .map(|i| i.stats.fetch_attempts.get(&tier).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of certified blobs.
    pub fn blob_count(&self) -> usize {
        self.read().map(|i| i.blobs.len()).unwrap_or(0)
    }

    /// Registrations that were never certified.
    pub fn stale_registrations(&self) -> Vec<String> {
        self.read()
            .map(|i| {
                let mut stale: Vec<String> = i
                    .registrations
                    .iter()
                    .filter(|(_, r)| r.certified.is_none())
                    .map(|(digest, _)| digest.clone())
                    .collect();
                stale.sort();
                stale
            })
            .unwrap_or_default()
    }

    /// The register request recorded for a registration.
    pub fn registration_request(&self, digest: &str) -> Option<RegisterRequest> {
        self.read()
            .ok()
            .and_then(|i| i.registrations.get(digest).map(|r| r.request.clone()))
    }
}

impl Default for MemoryDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn register(&self, request: &RegisterRequest) -> Result<RegistrationReceipt> {
        let mut inner = self.write()?;

        if inner.behavior.reject_register {
            return Err(StoreError::AuthorizationRejected(
                "holder declined register transaction".into(),
            ));
        }

        let digest = format!("register-{:08}", inner.next_registration);
        inner.next_registration += 1;

        inner.registrations.insert(
            digest.clone(),
            Registration {
                request: request.clone(),
                registered_at: Instant::now(),
                uploaded: None,
                certified: None,
            },
        );

        Ok(RegistrationReceipt {
            digest,
            size: request.size,
            owner: request.owner,
        })
    }

    async fn upload(&self, receipt: &RegistrationReceipt, blob: &EncodedBlob) -> Result<UploadAck> {
        let mut inner = self.write()?;
        inner.stats.upload_attempts += 1;

        if inner.behavior.failing_uploads > 0 {
            inner.behavior.failing_uploads -= 1;
            return Err(StoreError::Network("upload relay connection reset".into()));
        }

        let propagation_delay = inner.behavior.propagation_delay;
        let registration = inner
            .registrations
            .get_mut(&receipt.digest)
            .ok_or_else(|| StoreError::UnknownRegistration(receipt.digest.clone()))?;

        if registration.registered_at.elapsed() < propagation_delay {
            return Err(StoreError::RegistrationPending(receipt.digest.clone()));
        }

        if blob.size() != registration.request.size {
            return Err(StoreError::SizeMismatch {
                registered: registration.request.size,
                uploaded: blob.size(),
            });
        }
        blob.verify()?;

        let chunks = blob.chunks().len();
        registration.uploaded = Some(blob.clone());
        Ok(UploadAck { chunks })
    }

    async fn certify(&self, receipt: &RegistrationReceipt) -> Result<Option<BlobId>> {
        let mut inner = self.write()?;

        if inner.behavior.reject_certify {
            return Err(StoreError::AuthorizationRejected(
                "holder declined certify transaction".into(),
            ));
        }
        let withhold = inner.behavior.withhold_reference;

        let registration = inner
            .registrations
            .get_mut(&receipt.digest)
            .ok_or_else(|| StoreError::UnknownRegistration(receipt.digest.clone()))?;

        let blob = registration
            .uploaded
            .as_ref()
            .ok_or_else(|| StoreError::NotUploaded(receipt.digest.clone()))?;

        let blob_id = blob.content_id();
        let bytes = blob.reassemble();
        registration.certified = Some(blob_id.clone());

        inner.blobs.insert(
            blob_id.clone(),
            StoredBlob {
                bytes,
                certified_at: Instant::now(),
            },
        );

        if withhold {
            return Ok(None);
        }
        Ok(Some(blob_id))
    }

    async fn fetch(&self, blob_id: &BlobId, tier: ReadTier) -> Result<Bytes> {
        let fault = {
            let mut inner = self.write()?;
            *inner.stats.fetch_attempts.entry(tier).or_default() += 1;
            inner.behavior.tier_faults.get(&tier).copied()
        };

        match fault {
            Some(TierFault::Down) => {
                return Err(StoreError::Network(format!("{tier} unreachable")));
            }
            Some(TierFault::Hang) => {
                tokio::time::sleep(HANG_DURATION).await;
                return Err(StoreError::Network(format!("{tier} stalled")));
            }
            Some(TierFault::Corrupt) => {
                return Ok(Bytes::from_static(b"<html>502 Bad Gateway</html>"));
            }
            None => {}
        }

        let inner = self.read()?;
        let stored = inner
            .blobs
            .get(blob_id)
            .ok_or_else(|| StoreError::NotFound(blob_id.clone()))?;

        if tier == ReadTier::Aggregator
            && stored.certified_at.elapsed() < inner.behavior.aggregator_lag
        {
            return Err(StoreError::NotFound(blob_id.clone()));
        }

        Ok(stored.bytes.clone())
    }
}
