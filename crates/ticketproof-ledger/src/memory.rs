//! In-memory implementation of the Ledger trait.
//!
//! This is primarily for testing. Containers are created, filled and
//! transferred directly; queries can be made to fail or stall to exercise
//! the verifier's handling of an unreachable ledger.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use ticketproof_core::{Address, ContainerId, TicketId};

use crate::error::{LedgerError, Result};
use crate::traits::Ledger;

/// In-memory ledger.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
pub struct MemoryLedger {
    inner: RwLock<MemoryLedgerInner>,
}

struct MemoryLedgerInner {
    /// Containers indexed by ID.
    containers: HashMap<ContainerId, Container>,

    /// Counter for container IDs.
    next_container: u64,

    /// Queries fail with a transport error while set.
    unavailable: bool,

    /// Delay applied to every query.
    latency: Duration,

    /// Number of queries answered or attempted.
    queries: u64,
}

struct Container {
    owner: Address,
    members: BTreeSet<TicketId>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryLedgerInner {
                containers: HashMap::new(),
                next_container: 1,
                unavailable: false,
                latency: Duration::ZERO,
                queries: 0,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryLedgerInner>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Backend("memory ledger lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryLedgerInner>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Backend("memory ledger lock poisoned".into()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an empty container owned by `owner`.
    pub fn create_container(&self, owner: Address) -> Result<ContainerId> {
        let mut inner = self.write()?;
        let id = ContainerId::new(format!("container-{:04}", inner.next_container));
        inner.next_container += 1;
        inner.containers.insert(
            id.clone(),
            Container {
                owner,
                members: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    /// Place a ticket in a container.
    pub fn add_item(&self, container: &ContainerId, item: TicketId) -> Result<()> {
        let mut inner = self.write()?;
        let entry = inner
            .containers
            .get_mut(container)
            .ok_or_else(|| LedgerError::ContainerNotFound(container.clone()))?;
        entry.members.insert(item);
        Ok(())
    }

    /// Take a ticket out of a container. Returns whether it was present.
    pub fn remove_item(&self, container: &ContainerId, item: &TicketId) -> Result<bool> {
        let mut inner = self.write()?;
        let entry = inner
            .containers
            .get_mut(container)
            .ok_or_else(|| LedgerError::ContainerNotFound(container.clone()))?;
        Ok(entry.members.remove(item))
    }

    /// Hand a container's ownership capability to another account.
    pub fn transfer(&self, container: &ContainerId, new_owner: Address) -> Result<()> {
        let mut inner = self.write()?;
        let entry = inner
            .containers
            .get_mut(container)
            .ok_or_else(|| LedgerError::ContainerNotFound(container.clone()))?;
        entry.owner = new_owner;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fault injection
    // ─────────────────────────────────────────────────────────────────────────

    /// Make every query fail with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.unavailable = unavailable;
        }
    }

    /// Delay every query by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        if let Ok(mut inner) = self.inner.write() {
            inner.latency = latency;
        }
    }

    /// Number of queries seen.
    pub fn query_count(&self) -> u64 {
        self.read().map(|i| i.queries).unwrap_or(0)
    }

    /// Count the query and apply injected faults.
    async fn begin_query(&self) -> Result<()> {
        let latency = {
            let mut inner = self.write()?;
            inner.queries += 1;
            if inner.unavailable {
                return Err(LedgerError::Transport("ledger node unreachable".into()));
            }
            inner.latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn find_owned_containers(&self, owner: &Address) -> Result<Vec<ContainerId>> {
        self.begin_query().await?;

        let inner = self.read()?;
        let mut owned: Vec<ContainerId> = inner
            .containers
            .iter()
            .filter(|(_, c)| &c.owner == owner)
            .map(|(id, _)| id.clone())
            .collect();
        owned.sort();
        Ok(owned)
    }

    async fn container_has_member(&self, container: &ContainerId, item: &TicketId) -> Result<bool> {
        self.begin_query().await?;

        let inner = self.read()?;
        let entry = inner
            .containers
            .get(container)
            .ok_or_else(|| LedgerError::ContainerNotFound(container.clone()))?;
        Ok(entry.members.contains(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketproof_core::Keypair;

    fn address(seed: u8) -> Address {
        Keypair::from_seed(&[seed; 32]).address()
    }

    #[tokio::test]
    async fn test_owned_containers() {
        let ledger = MemoryLedger::new();
        let alice = address(1);
        let bob = address(2);

        let a1 = ledger.create_container(alice).unwrap();
        let _b1 = ledger.create_container(bob).unwrap();
        let a2 = ledger.create_container(alice).unwrap();

        let owned = ledger.find_owned_containers(&alice).await.unwrap();
        assert_eq!(owned, vec![a1, a2]);
    }

    #[tokio::test]
    async fn test_membership() {
        let ledger = MemoryLedger::new();
        let container = ledger.create_container(address(1)).unwrap();
        ledger.add_item(&container, "T1".into()).unwrap();

        assert!(ledger.container_has_member(&container, &"T1".into()).await.unwrap());
        assert!(!ledger.container_has_member(&container, &"T2".into()).await.unwrap());

        assert!(ledger.remove_item(&container, &"T1".into()).unwrap());
        assert!(!ledger.container_has_member(&container, &"T1".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_transfer_moves_ownership() {
        let ledger = MemoryLedger::new();
        let container = ledger.create_container(address(1)).unwrap();

        ledger.transfer(&container, address(2)).unwrap();

        assert!(ledger.find_owned_containers(&address(1)).await.unwrap().is_empty());
        assert_eq!(ledger.find_owned_containers(&address(2)).await.unwrap(), vec![container]);
    }

    #[tokio::test]
    async fn test_unknown_container() {
        let ledger = MemoryLedger::new();
        let missing = ContainerId::from("container-9999");

        assert!(matches!(
            ledger.add_item(&missing, "T1".into()),
            Err(LedgerError::ContainerNotFound(_))
        ));
        assert!(matches!(
            ledger.container_has_member(&missing, &"T1".into()).await,
            Err(LedgerError::ContainerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let ledger = MemoryLedger::new();
        ledger.set_unavailable(true);

        let result = ledger.find_owned_containers(&address(1)).await;
        assert!(matches!(result, Err(LedgerError::Transport(_))));
        assert_eq!(ledger.query_count(), 1);
    }
}
