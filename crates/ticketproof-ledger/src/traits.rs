//! Ledger trait: the abstract interface to the ownership ledger.

use async_trait::async_trait;
use ticketproof_core::{Address, ContainerId, TicketId};

use crate::error::Result;

/// The Ledger trait: read-only ownership queries.
///
/// Tickets are never owned directly by an account. An account owns
/// containers (identified by the capability objects it holds), and a
/// container's membership set lists the tickets placed in it.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Containers whose ownership capability is held by `owner`.
    async fn find_owned_containers(&self, owner: &Address) -> Result<Vec<ContainerId>>;

    /// Whether `item` is currently a member of `container`.
    async fn container_has_member(&self, container: &ContainerId, item: &TicketId) -> Result<bool>;
}
