//! Ownership check: does an account hold a ticket?

use std::time::Duration;

use ticketproof_core::{Address, TicketId};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::traits::Ledger;

/// Whether `owner` holds `ticket` in any container it owns.
///
/// Every owned container is checked, in the order the ledger lists them,
/// stopping at the first one that lists the ticket. A ledger error is
/// returned as-is; it is never read as "not owned".
pub async fn holds_ticket<L: Ledger + ?Sized>(
    ledger: &L,
    owner: &Address,
    ticket: &TicketId,
) -> Result<bool> {
    let containers = ledger.find_owned_containers(owner).await?;
    debug!(%owner, containers = containers.len(), "enumerated owned containers");

    for container in &containers {
        if ledger.container_has_member(container, ticket).await? {
            debug!(%owner, %container, ticket_id = %ticket, "ticket found in container");
            return Ok(true);
        }
    }

    Ok(false)
}

/// [`holds_ticket`] bounded by `timeout`. An elapsed query is
/// [`LedgerError::Timeout`].
pub async fn holds_ticket_within<L: Ledger + ?Sized>(
    ledger: &L,
    owner: &Address,
    ticket: &TicketId,
    timeout: Duration,
) -> Result<bool> {
    tokio::time::timeout(timeout, holds_ticket(ledger, owner, ticket))
        .await
        .map_err(|_| LedgerError::Timeout(timeout))?
}
