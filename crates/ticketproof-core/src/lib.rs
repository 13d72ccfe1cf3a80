//! # Ticket Proof Core
//!
//! Pure primitives for ticket proofs: canonical messages, signatures,
//! proof records, and the compact code payload.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over the proof data structures.
//!
//! ## Key Types
//!
//! - [`TicketProof`] - The signed, durable record of a holder's claim
//! - [`CompactPayload`] - The pointer embedded in a scannable code
//! - [`Address`] - Identity derived from a signing key
//! - [`ClaimedAddress`] - Signer identity as written in a proof, unparsed
//! - [`SerializedSignature`] - Scheme flag, signature and public key in one blob
//!
//! ## Canonicalization
//!
//! The signed message is a fixed, line-oriented text. See [`canonical`] module.

pub mod canonical;
pub mod compact;
pub mod crypto;
pub mod error;
pub mod proof;
pub mod types;

pub use canonical::{canonical_message, validate_identifier, MAX_IDENTIFIER_LEN};
pub use compact::{CompactPayload, ErrorCorrection, ScanCode};
pub use crypto::{
    verify_personal_message, Address, ClaimedAddress, Ed25519PublicKey, Ed25519Signature,
    Keypair, SerializedSignature,
};
pub use error::CoreError;
pub use proof::{ProofClaim, TicketProof};
pub use types::{BlobId, ContainerId, EventId, TicketId};
