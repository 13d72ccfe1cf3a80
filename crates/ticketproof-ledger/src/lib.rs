//! # Ticket Proof Ledger
//!
//! Ledger abstraction for ticket ownership. The ledger is the system of
//! record for who holds which ticket: an account owns containers, and each
//! container lists the tickets placed in it.
//!
//! ## Key Types
//!
//! - [`Ledger`] - The async trait for ownership queries
//! - [`MemoryLedger`] - In-memory ledger for tests
//! - [`holds_ticket`] - Does an account hold a ticket in any of its containers?
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ticketproof_core::Keypair;
//! use ticketproof_ledger::{holds_ticket, MemoryLedger};
//!
//! async fn example() {
//!     let holder = Keypair::generate().address();
//!     let ledger = MemoryLedger::new();
//!
//!     let container = ledger.create_container(holder).unwrap();
//!     ledger.add_item(&container, "T1".into()).unwrap();
//!
//!     assert!(holds_ticket(&ledger, &holder, &"T1".into()).await.unwrap());
//! }
//! ```

pub mod error;
pub mod memory;
pub mod ownership;
pub mod traits;

pub use error::{LedgerError, Result};
pub use memory::MemoryLedger;
pub use ownership::{holds_ticket, holds_ticket_within};
pub use traits::Ledger;
