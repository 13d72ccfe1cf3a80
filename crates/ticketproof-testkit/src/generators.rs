//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ticketproof_core::{
    BlobId, EventId, Keypair, ProofClaim, TicketId, TicketProof, MAX_IDENTIFIER_LEN,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate an identifier that is safe to embed in the canonical message.
pub fn identifier() -> impl Strategy<Value = String> {
    prop_oneof![
        "0x[0-9a-f]{1,64}",
        "[A-Za-z0-9][A-Za-z0-9 _./:-]{0,63}",
        "\\PC{1,32}",
    ]
    .prop_filter("within identifier limit", |s| s.len() <= MAX_IDENTIFIER_LEN)
}

/// Generate an identifier containing a control character.
pub fn unsafe_identifier() -> impl Strategy<Value = String> {
    (
        "[A-Za-z0-9]{0,16}",
        prop::sample::select(vec!['\n', '\r', '\0', '\t', '\u{7f}']),
        "[A-Za-z0-9]{0,16}",
    )
        .prop_map(|(head, control, tail)| format!("{head}{control}{tail}"))
}

/// Generate a ticket id.
pub fn ticket_id() -> impl Strategy<Value = TicketId> {
    identifier().prop_map(TicketId::new)
}

/// Generate an event id.
pub fn event_id() -> impl Strategy<Value = EventId> {
    identifier().prop_map(EventId::new)
}

/// Generate a blob id shaped like a store content reference.
pub fn blob_id() -> impl Strategy<Value = BlobId> {
    any::<[u8; 32]>().prop_map(|bytes| BlobId::new(hex::encode(bytes)))
}

/// Generate a reasonable timestamp (Unix seconds).
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800
}

/// Parameters for generating a proof.
#[derive(Debug, Clone)]
pub struct ProofParams {
    pub keypair: Keypair,
    pub ticket_id: TicketId,
    pub event_id: EventId,
    pub timestamp: i64,
}

impl Arbitrary for ProofParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (keypair(), ticket_id(), event_id(), timestamp())
            .prop_map(|(keypair, ticket_id, event_id, timestamp)| ProofParams {
                keypair,
                ticket_id,
                event_id,
                timestamp,
            })
            .boxed()
    }
}

/// Sign a proof from generated parameters.
pub fn proof_from_params(params: &ProofParams) -> TicketProof {
    let claim = ProofClaim::new(
        params.ticket_id.clone(),
        params.event_id.clone(),
        params.timestamp,
    );
    let signature = params.keypair.sign_personal_message(&claim.message());
    claim.into_proof(signature, params.keypair.address())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketproof_core::{validate_identifier, ScanCode};

    proptest! {
        #[test]
        fn test_generated_identifiers_are_safe(id in identifier()) {
            prop_assert!(validate_identifier("ticket_id", &id).is_ok());
        }

        #[test]
        fn test_unsafe_identifiers_are_rejected(id in unsafe_identifier()) {
            prop_assert!(validate_identifier("ticket_id", &id).is_err());
        }

        #[test]
        fn test_proofs_recover_their_signer(params: ProofParams) {
            let proof = proof_from_params(&params);
            prop_assert_eq!(proof.recover_signer().unwrap(), proof.signer_address);
        }

        #[test]
        fn test_json_preserves_proof(params: ProofParams) {
            let proof = proof_from_params(&params);
            let decoded = TicketProof::from_json_slice(&proof.to_json_bytes().unwrap()).unwrap();
            prop_assert_eq!(decoded, proof);
        }

        #[test]
        fn test_scan_code_keeps_ticket(blob in blob_id(), ticket in ticket_id()) {
            let code = ScanCode::encode(&blob, &ticket).unwrap();
            let payload = ScanCode::decode(&code.text).unwrap();
            prop_assert_eq!(payload.ticket_id, ticket);
            prop_assert_eq!(payload.blob_id, blob);
        }
    }
}
