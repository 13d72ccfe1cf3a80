//! Error types for the ticket proof core.

use thiserror::Error;

/// Core errors that can occur while building, encoding or checking proofs.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("unsupported signature scheme flag: {0:#04x}")]
    UnsupportedScheme(u8),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid {field}: {reason}")]
    InvalidIdentifier { field: &'static str, reason: String },

    #[error("invalid payload format: {0}")]
    InvalidPayloadFormat(String),

    #[error("payload too large for a scannable code: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}
