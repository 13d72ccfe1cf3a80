//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;
use std::time::Duration;

use ticketproof::{Issuer, KeypairSigner, Scanner, TicketProofConfig};
use ticketproof_core::{Address, ContainerId, Keypair, ProofClaim, TicketId, TicketProof};
use ticketproof_ledger::MemoryLedger;
use ticketproof_store::{MemoryDurableStore, PublishConfig};

/// A ticket holder with a keypair signer, a container on the ledger, and
/// in-memory store and ledger.
pub struct HolderFixture {
    pub keypair: Keypair,
    pub signer: Arc<KeypairSigner>,
    pub store: Arc<MemoryDurableStore>,
    pub ledger: Arc<MemoryLedger>,
    pub container: ContainerId,
}

impl HolderFixture {
    /// Create a holder with a random keypair.
    pub fn new() -> Self {
        Self::with_keypair(Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_keypair(Keypair::from_seed(&seed))
    }

    fn with_keypair(keypair: Keypair) -> Self {
        Self::sharing(
            keypair,
            Arc::new(MemoryDurableStore::new()),
            Arc::new(MemoryLedger::new()),
        )
    }

    /// Create a holder on an existing store and ledger.
    pub fn sharing(
        keypair: Keypair,
        store: Arc<MemoryDurableStore>,
        ledger: Arc<MemoryLedger>,
    ) -> Self {
        let container = ledger
            .create_container(keypair.address())
            .unwrap_or_else(|e| panic!("fixture ledger: {e}"));
        Self {
            signer: Arc::new(KeypairSigner::new(keypair.clone())),
            keypair,
            store,
            ledger,
            container,
        }
    }

    /// The holder's address.
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    /// Place a ticket in the holder's container.
    pub fn give_ticket(&self, ticket_id: impl Into<TicketId>) {
        self.ledger
            .add_item(&self.container, ticket_id.into())
            .unwrap_or_else(|e| panic!("fixture ledger: {e}"));
    }

    /// Take a ticket out of the holder's container.
    pub fn take_ticket(&self, ticket_id: impl Into<TicketId>) {
        self.ledger
            .remove_item(&self.container, &ticket_id.into())
            .unwrap_or_else(|e| panic!("fixture ledger: {e}"));
    }

    /// Sign a proof directly, without going through an assembler.
    pub fn signed_proof(&self, ticket_id: &str, event_id: &str, timestamp: i64) -> TicketProof {
        let claim = ProofClaim::new(ticket_id.into(), event_id.into(), timestamp);
        let signature = self.keypair.sign_personal_message(&claim.message());
        claim.into_proof(signature, self.address())
    }

    /// An issuer for this holder.
    pub fn issuer(&self, config: &TicketProofConfig) -> Issuer<KeypairSigner, MemoryDurableStore> {
        Issuer::new(
            Arc::clone(&self.signer),
            Arc::clone(&self.store),
            config.publish.clone(),
        )
    }

    /// A scanner reading from this holder's store and ledger.
    pub fn scanner(&self, config: &TicketProofConfig) -> Scanner<MemoryDurableStore, MemoryLedger> {
        Scanner::from_config(Arc::clone(&self.store), Arc::clone(&self.ledger), config)
    }
}

impl Default for HolderFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Config with no settle delay and short backoff, for tests on a real clock.
pub fn fast_config() -> TicketProofConfig {
    TicketProofConfig::default().with_publish(PublishConfig {
        settle_delay: Duration::ZERO,
        backoff_base: Duration::from_millis(1),
        backoff_max: Duration::from_millis(10),
        ..PublishConfig::default()
    })
}

/// Create holders sharing one store and one ledger.
pub fn multi_holder_fixtures(count: usize) -> Vec<HolderFixture> {
    let store = Arc::new(MemoryDurableStore::new());
    let ledger = Arc::new(MemoryLedger::new());
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            HolderFixture::sharing(
                Keypair::from_seed(&seed),
                Arc::clone(&store),
                Arc::clone(&ledger),
            )
        })
        .collect()
}

/// A fresh random ticket identifier.
pub fn random_ticket_id() -> TicketId {
    TicketId::new(format!("0x{}", hex::encode(rand::random::<[u8; 16]>())))
}
