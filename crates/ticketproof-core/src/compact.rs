//! Compact code payload: the pointer embedded in a scannable code.
//!
//! The code deliberately carries only the storage reference of the full
//! proof (`w`) and the ticket id (`t`), never the proof itself. A tiny
//! payload keeps the symbol small enough to scan reliably from a phone
//! screen at the gate.
//!
//! Wire format:
//!
//! ```json
//! {"w":"<blob id>","t":"<ticket id>"}
//! ```
//!
//! Decoders ignore unknown fields. The payload carries no authenticity;
//! trust comes only from fetching and auditing the referenced proof.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{BlobId, TicketId};

/// Symbol version considered "compact" when choosing error correction.
pub const COMPACT_SYMBOL_VERSION: u8 = 10;

/// Error-correction level of the scannable symbol.
///
/// Higher levels survive more damage (glare, cracked screens) at the cost
/// of capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// ~7% recovery.
    Low,
    /// ~15% recovery.
    Medium,
    /// ~25% recovery.
    Quartile,
    /// ~30% recovery.
    High,
}

impl ErrorCorrection {
    /// Levels from most to least robust.
    pub const BY_ROBUSTNESS: [Self; 4] = [Self::High, Self::Quartile, Self::Medium, Self::Low];

    /// Byte-mode capacity of a compact (version 10) symbol.
    pub const fn compact_capacity(self) -> usize {
        match self {
            Self::Low => 271,
            Self::Medium => 213,
            Self::Quartile => 151,
            Self::High => 119,
        }
    }

    /// Byte-mode capacity of the largest (version 40) symbol.
    pub const fn max_capacity(self) -> usize {
        match self {
            Self::Low => 2953,
            Self::Medium => 2331,
            Self::Quartile => 1663,
            Self::High => 1273,
        }
    }

    /// Pick the level for a payload of `len` bytes.
    ///
    /// Prefers the most robust level that still fits a compact symbol; for
    /// larger payloads, the most robust level that fits at all.
    pub fn for_payload_len(len: usize) -> Result<Self, CoreError> {
        Self::BY_ROBUSTNESS
            .into_iter()
            .find(|level| len <= level.compact_capacity())
            .or_else(|| {
                Self::BY_ROBUSTNESS
                    .into_iter()
                    .find(|level| len <= level.max_capacity())
            })
            .ok_or(CoreError::PayloadTooLarge {
                len,
                max: Self::Low.max_capacity(),
            })
    }
}

/// The pointer record embedded in a scannable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactPayload {
    /// Durable-store reference of the full proof.
    #[serde(rename = "w")]
    pub blob_id: BlobId,

    /// Ticket id, for inspection without a fetch.
    #[serde(rename = "t")]
    pub ticket_id: TicketId,
}

impl CompactPayload {
    /// Create a payload.
    pub fn new(blob_id: BlobId, ticket_id: TicketId) -> Self {
        Self { blob_id, ticket_id }
    }

    /// Serialize to the wire text.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Parse scanned text.
    ///
    /// Fails with [`CoreError::InvalidPayloadFormat`] if the text is not a
    /// JSON object, or `w`/`t` are missing, not strings, or empty.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value = serde_json::from_str(raw.trim())
            .map_err(|e| CoreError::InvalidPayloadFormat(e.to_string()))?;

        // Structs also deserialize from arrays; only an object is a payload.
        if !value.is_object() {
            return Err(CoreError::InvalidPayloadFormat("expected a JSON object".into()));
        }

        let payload: Self = serde_json::from_value(value)
            .map_err(|e| CoreError::InvalidPayloadFormat(e.to_string()))?;

        if payload.blob_id.as_str().is_empty() {
            return Err(CoreError::InvalidPayloadFormat("empty field `w`".into()));
        }
        if payload.ticket_id.as_str().is_empty() {
            return Err(CoreError::InvalidPayloadFormat("empty field `t`".into()));
        }

        Ok(payload)
    }
}

/// A scannable symbol ready for rendering: the text to embed and the
/// error-correction level to render it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCode {
    /// The payload text.
    pub text: String,
    /// The chosen error-correction level.
    pub error_correction: ErrorCorrection,
}

impl ScanCode {
    /// Encode a storage reference and ticket id into a scannable symbol.
    pub fn encode(blob_id: &BlobId, ticket_id: &TicketId) -> Result<Self, CoreError> {
        let text = CompactPayload::new(blob_id.clone(), ticket_id.clone()).to_json()?;
        let error_correction = ErrorCorrection::for_payload_len(text.len())?;
        Ok(Self {
            text,
            error_correction,
        })
    }

    /// Decode text read from a symbol.
    pub fn decode(raw_text: &str) -> Result<CompactPayload, CoreError> {
        CompactPayload::from_json(raw_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let payload = CompactPayload::new("R".into(), "T1".into());
        assert_eq!(payload.to_json().unwrap(), r#"{"w":"R","t":"T1"}"#);
    }

    #[test]
    fn test_encode_decode() {
        let code = ScanCode::encode(&"R".into(), &"T1".into()).unwrap();
        let payload = ScanCode::decode(&code.text).unwrap();

        assert_eq!(payload.blob_id.as_str(), "R");
        assert_eq!(payload.ticket_id.as_str(), "T1");
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let payload = ScanCode::decode(r#"{"t":"T1","v":2,"w":"R"}"#).unwrap();
        assert_eq!(payload, CompactPayload::new("R".into(), "T1".into()));
    }

    #[test]
    fn test_decode_tolerates_whitespace() {
        assert!(ScanCode::decode("  {\"w\":\"R\",\"t\":\"T1\"}\n").is_ok());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for raw in [
            "",
            "hello",
            "[1,2]",
            r#"["R","T1"]"#,
            r#""just a string""#,
            r#"{"w":"R"}"#,
            r#"{"t":"T1"}"#,
            r#"{"w":1,"t":"T1"}"#,
            r#"{"w":"R","t":null}"#,
            r#"{"w":"","t":"T1"}"#,
            r#"{"w":"R","t":""}"#,
        ] {
            assert!(
                matches!(ScanCode::decode(raw), Err(CoreError::InvalidPayloadFormat(_))),
                "expected InvalidPayloadFormat for {raw:?}"
            );
        }
    }

    #[test]
    fn test_error_correction_selection() {
        assert_eq!(ErrorCorrection::for_payload_len(40).unwrap(), ErrorCorrection::High);
        assert_eq!(ErrorCorrection::for_payload_len(119).unwrap(), ErrorCorrection::High);
        assert_eq!(ErrorCorrection::for_payload_len(120).unwrap(), ErrorCorrection::Quartile);
        assert_eq!(ErrorCorrection::for_payload_len(200).unwrap(), ErrorCorrection::Medium);
        assert_eq!(ErrorCorrection::for_payload_len(260).unwrap(), ErrorCorrection::Low);
        // Beyond compact capacity, fall back to the most robust level that fits.
        assert_eq!(ErrorCorrection::for_payload_len(1000).unwrap(), ErrorCorrection::High);
        assert_eq!(ErrorCorrection::for_payload_len(2000).unwrap(), ErrorCorrection::Medium);
        assert!(matches!(
            ErrorCorrection::for_payload_len(3000),
            Err(CoreError::PayloadTooLarge { len: 3000, max: 2953 })
        ));
    }

    #[test]
    fn test_realistic_payload_stays_compact() {
        // 32-byte blob id in base64url and a 0x-prefixed 32-byte object id.
        let blob_id = BlobId::new("M3vYcz0mNFQ9dbQyS2o4WUpZcEt3cV9HOHJ2N0RmWE0");
        let ticket_id = TicketId::new(format!("0x{}", "ab".repeat(32)));

        let code = ScanCode::encode(&blob_id, &ticket_id).unwrap();
        assert!(code.text.len() <= ErrorCorrection::Low.compact_capacity());
    }
}
