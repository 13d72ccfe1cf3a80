//! TicketProof: the signed, durable record of a holder's claim.
//!
//! A proof is immutable. It is created once by the holder's device, stored
//! as a JSON blob, and only ever read afterwards.

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_message, validate_identifier};
use crate::crypto::{verify_personal_message, Address, ClaimedAddress, SerializedSignature};
use crate::error::CoreError;
use crate::types::{EventId, TicketId};

/// The unsigned part of a proof: what the holder is asked to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofClaim {
    /// The ticket being claimed.
    pub ticket_id: TicketId,
    /// The event the ticket belongs to.
    pub event_id: EventId,
    /// Signing time (Unix seconds).
    pub timestamp: i64,
}

impl ProofClaim {
    /// Create a claim.
    pub fn new(ticket_id: TicketId, event_id: EventId, timestamp: i64) -> Self {
        Self {
            ticket_id,
            event_id,
            timestamp,
        }
    }

    /// Check both identifiers are safe to embed in the canonical message.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_identifier("ticket_id", self.ticket_id.as_str())?;
        validate_identifier("event_id", self.event_id.as_str())
    }

    /// The canonical message to sign.
    pub fn message(&self) -> Vec<u8> {
        canonical_message(self.ticket_id.as_str(), self.event_id.as_str(), self.timestamp)
    }

    /// Attach a signature, producing the full proof.
    pub fn into_proof(
        self,
        signature: SerializedSignature,
        signer_address: impl Into<ClaimedAddress>,
    ) -> TicketProof {
        TicketProof {
            ticket_id: self.ticket_id,
            event_id: self.event_id,
            timestamp: self.timestamp,
            signature,
            signer_address: signer_address.into(),
        }
    }
}

/// The full proof record stored in the durable store.
///
/// Field names are part of the stored JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketProof {
    /// The ticket being claimed.
    pub ticket_id: TicketId,

    /// The event the ticket belongs to.
    pub event_id: EventId,

    /// Signing time (Unix seconds). Author-claimed.
    pub timestamp: i64,

    /// Personal-message signature over the canonical message.
    pub signature: SerializedSignature,

    /// Identity claimed to have produced the signature.
    pub signer_address: ClaimedAddress,
}

impl TicketProof {
    /// Rebuild the canonical message from this proof's own fields.
    pub fn signed_message(&self) -> Vec<u8> {
        canonical_message(self.ticket_id.as_str(), self.event_id.as_str(), self.timestamp)
    }

    /// Recover the address that actually produced the signature.
    ///
    /// Fails if an identifier is unsafe, the signature is malformed, or it
    /// does not verify over the canonical message. Does not compare against
    /// `signer_address`; callers decide what a mismatch means.
    pub fn recover_signer(&self) -> Result<Address, CoreError> {
        validate_identifier("ticket_id", self.ticket_id.as_str())?;
        validate_identifier("event_id", self.event_id.as_str())?;

        let public_key = verify_personal_message(&self.signed_message(), &self.signature)?;
        Ok(public_key.to_address())
    }

    /// Age of the proof relative to `now` (seconds). Negative when the
    /// timestamp lies in the future.
    pub fn age_at(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    /// Encode as the stored JSON blob.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Decode from a stored JSON blob.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn signed_proof(keypair: &Keypair) -> TicketProof {
        let claim = ProofClaim::new("0xticket".into(), "0xevent".into(), 1736870400);
        let signature = keypair.sign_personal_message(&claim.message());
        claim.into_proof(signature, keypair.address())
    }

    #[test]
    fn test_recover_signer() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let proof = signed_proof(&keypair);

        assert_eq!(proof.recover_signer().unwrap(), keypair.address());
    }

    #[test]
    fn test_tampered_field_changes_recovery() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let mut proof = signed_proof(&keypair);
        proof.timestamp += 1;

        assert!(matches!(proof.recover_signer(), Err(CoreError::InvalidSignature)));
    }

    #[test]
    fn test_unsafe_identifier_is_refused() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let claim = ProofClaim::new("T\nEvent: X".into(), "E".into(), 1);
        let signature = keypair.sign_personal_message(&claim.message());
        let proof = claim.into_proof(signature, keypair.address());

        assert!(matches!(
            proof.recover_signer(),
            Err(CoreError::InvalidIdentifier { field: "ticket_id", .. })
        ));
    }

    #[test]
    fn test_json_field_names() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let proof = signed_proof(&keypair);

        let value: serde_json::Value =
            serde_json::from_slice(&proof.to_json_bytes().unwrap()).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 5);
        assert_eq!(obj["ticket_id"], "0xticket");
        assert_eq!(obj["event_id"], "0xevent");
        assert_eq!(obj["timestamp"], 1736870400);
        assert_eq!(obj["signer_address"], keypair.address().to_string());
        assert!(obj["signature"].is_string());
    }

    #[test]
    fn test_json_decode() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let proof = signed_proof(&keypair);
        let bytes = proof.to_json_bytes().unwrap();

        assert_eq!(TicketProof::from_json_slice(&bytes).unwrap(), proof);
        assert!(TicketProof::from_json_slice(b"{\"ticket_id\":\"x\"}").is_err());
        assert!(TicketProof::from_json_slice(b"not json").is_err());
    }

    #[test]
    fn test_non_canonical_signer_address_still_decodes() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let mut value: serde_json::Value =
            serde_json::from_slice(&signed_proof(&keypair).to_json_bytes().unwrap()).unwrap();
        value["signer_address"] = "0xDEADBEEF".into();

        let proof = TicketProof::from_json_slice(&serde_json::to_vec(&value).unwrap()).unwrap();

        assert_eq!(proof.signer_address.as_str(), "0xDEADBEEF");
        assert_eq!(proof.recover_signer().unwrap(), keypair.address());
    }

    proptest::proptest! {
        #[test]
        fn test_any_signature_byte_flip_breaks_recovery(
            index in 0usize..crate::crypto::SERIALIZED_SIGNATURE_LEN,
            mask in 1u8..=255,
        ) {
            let keypair = Keypair::from_seed(&[0x42; 32]);
            let mut proof = signed_proof(&keypair);

            let mut bytes = proof.signature.to_bytes().unwrap();
            bytes[index] ^= mask;
            proof.signature = SerializedSignature::from_bytes(&bytes);

            // Either verification fails outright, or a different key signed it.
            if let Ok(address) = proof.recover_signer() {
                proptest::prop_assert_ne!(address, keypair.address());
            }
        }
    }

    #[test]
    fn test_age_at() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let proof = signed_proof(&keypair);

        assert_eq!(proof.age_at(1736870400 + 30), 30);
        assert_eq!(proof.age_at(1736870400 - 30), -30);
    }
}
