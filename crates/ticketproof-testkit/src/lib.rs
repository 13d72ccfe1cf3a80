//! # Ticket Proof Testkit
//!
//! Testing utilities for ticket proofs.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known canonical messages, addresses and signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A holder wired to an in-memory store and ledger
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ticketproof_testkit::vectors::{all_vectors, proof_from_vector};
//!
//! for vector in all_vectors() {
//!     let proof = proof_from_vector(&vector);
//!     assert_eq!(proof.signer_address.to_string(), vector.expected_address);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ticketproof_testkit::generators::{ProofParams, proof_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn proofs_recover_their_signer(params: ProofParams) {
//!         let proof = proof_from_params(&params);
//!         prop_assert_eq!(proof.recover_signer().unwrap(), proof.signer_address);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ticketproof_testkit::fixtures::HolderFixture;
//!
//! let holder = HolderFixture::new();
//! holder.give_ticket("T1");
//! let proof = holder.signed_proof("T1", "E1", 1_736_870_400);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fast_config, multi_holder_fixtures, HolderFixture};
