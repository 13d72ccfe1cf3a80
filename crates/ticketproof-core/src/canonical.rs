//! Canonical message construction for ticket proofs.
//!
//! The signed message is a fixed, human-readable text so that wallets can
//! show the holder exactly what they are approving:
//!
//! ```text
//! Ticket Check-in
//! Ticket: {ticket_id}
//! Event: {event_id}
//! Time: {timestamp}
//! ```
//!
//! This layout is frozen. Every proof ever issued was signed over it, so any
//! change (whitespace, field order, number formatting) invalidates all of
//! them.
//!
//! The format is line-oriented, which means an identifier containing a line
//! break could make two different `(ticket_id, event_id)` pairs render to the
//! same bytes. [`validate_identifier`] closes that hole; the builder itself
//! stays infallible.

use crate::error::CoreError;

/// First line of every canonical message.
pub const MESSAGE_HEADER: &str = "Ticket Check-in";

/// Maximum identifier length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Build the canonical message bytes for a claim.
pub fn canonical_message(ticket_id: &str, event_id: &str, timestamp: i64) -> Vec<u8> {
    canonical_message_text(ticket_id, event_id, timestamp).into_bytes()
}

/// Build the canonical message as text.
pub fn canonical_message_text(ticket_id: &str, event_id: &str, timestamp: i64) -> String {
    format!(
        "{MESSAGE_HEADER}\nTicket: {ticket_id}\nEvent: {event_id}\nTime: {timestamp}"
    )
}

/// Check that an identifier can be embedded in a canonical message without
/// ambiguity.
///
/// Rejects empty identifiers, identifiers over [`MAX_IDENTIFIER_LEN`] bytes,
/// and identifiers containing any control character (including `\n`/`\r`).
pub fn validate_identifier(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::InvalidIdentifier {
            field,
            reason: "empty".into(),
        });
    }

    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(CoreError::InvalidIdentifier {
            field,
            reason: format!("{} bytes exceeds maximum of {}", value.len(), MAX_IDENTIFIER_LEN),
        });
    }

    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(CoreError::InvalidIdentifier {
            field,
            reason: format!("contains control character {:?}", c),
        });
    }

    Ok(())
}
