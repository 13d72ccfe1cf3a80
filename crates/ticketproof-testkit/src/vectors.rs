//! Golden test vectors for the canonical message, address derivation and
//! personal-message signatures.
//!
//! Ed25519 signing is deterministic, so every implementation given the same
//! seed and claim must produce these exact bytes.

use ticketproof_core::{canonical_message, Keypair, ProofClaim, TicketProof};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic key generation.
    pub seed: [u8; 32],
    /// Ticket identifier.
    pub ticket_id: &'static str,
    /// Event identifier.
    pub event_id: &'static str,
    /// Signing time.
    pub timestamp: i64,
    /// Expected canonical message.
    pub expected_message: &'static str,
    /// Expected public key (hex).
    pub expected_public_key: &'static str,
    /// Expected address.
    pub expected_address: &'static str,
    /// Expected serialized signature (base64).
    pub expected_signature: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "short identifiers",
            seed: [0x42; 32],
            ticket_id: "T1",
            event_id: "E1",
            timestamp: 1736870400, // 2025-01-14T16:00:00Z
            expected_message: "Ticket Check-in\nTicket: T1\nEvent: E1\nTime: 1736870400",
            expected_public_key: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            expected_address: "0x279beb6d4dcd31bae72e6e14c6ab274c15e404fba48b3f9ea33991c9eb02e788",
            expected_signature: "AE8z72s4JU9Cg9RYh9d4xDyV/vH2Zd18uxv1812hIsmnBMr3VYg9GBWoo3S/vbMIheB+vmDzqnD5YMiW56zJ2w8hUvjRm3kdJEUyQuFfLqtst8/6e2pe0wCXlg4GmIHbEg==",
        },
        GoldenVector {
            name: "object-id style identifiers at epoch zero",
            seed: [0x00; 32],
            ticket_id: "0x5f1c9a",
            event_id: "0xe7e47",
            timestamp: 0,
            expected_message: "Ticket Check-in\nTicket: 0x5f1c9a\nEvent: 0xe7e47\nTime: 0",
            expected_public_key: "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29",
            expected_address: "0x712d5312e42a9edb3b1c734b300aa3d783c2c4592bd880385098e11876aa29b4",
            expected_signature: "AEV+rEeoCgUf8LbRzHXMLjQ1KZ4dqGn+p+5BcT4wRSRty4esjK5rPpkD1EIqBa4n7e+jmoTA5evAqQNJ1s9xcQs7aie8zrakLWKjqNAqbw1zZTIVdx3iQ6Y6wEihi1naKQ==",
        },
        GoldenVector {
            name: "long identifiers and negative timestamp",
            seed: [0x01; 32],
            ticket_id: "ticket-with-a-much-longer-identifier-0001",
            event_id: "event/2026/main-stage",
            timestamp: -1,
            expected_message: "Ticket Check-in\nTicket: ticket-with-a-much-longer-identifier-0001\nEvent: event/2026/main-stage\nTime: -1",
            expected_public_key: "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            expected_address: "0x95de0245e4a1dcf13dc45168b65a22663561e74e907eb8a3a1028f1599f056b2",
            expected_signature: "AJJ+R9t+7ydDbFbE5vgjjOZiFsTwU0SMjunVO2HEKGWORPfxhMxjmyOjmSwArjxPBFKIzLr/Hl7GV6djVEwPzQ+KiOPddAnxlf1S2y08ul1yymcJvx2UEhvzdIgBtA9vXA==",
        },
    ]
}

/// Build the signed proof described by a golden vector.
pub fn proof_from_vector(vector: &GoldenVector) -> TicketProof {
    let keypair = Keypair::from_seed(&vector.seed);
    let claim = ProofClaim::new(vector.ticket_id.into(), vector.event_id.into(), vector.timestamp);
    let signature = keypair.sign_personal_message(&claim.message());
    claim.into_proof(signature, keypair.address())
}

/// Canonical message bytes for a golden vector.
pub fn message_from_vector(vector: &GoldenVector) -> Vec<u8> {
    canonical_message(vector.ticket_id, vector.event_id, vector.timestamp)
}
