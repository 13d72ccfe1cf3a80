//! Cryptographic primitives for ticket proofs.
//!
//! Wraps Ed25519 signing with strong types, derives holder addresses with
//! Blake3, and defines the serialized signature that travels inside a proof:
//!
//! ```text
//! flag (1 byte) || signature (64 bytes) || public key (32 bytes)
//! ```
//!
//! Carrying the public key lets a verifier recover the signing identity
//! from the proof alone, then compare its derived address with the claimed
//! `signer_address`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Scheme flag for Ed25519 signatures.
pub const ED25519_FLAG: u8 = 0x00;

/// Domain tag prepended to every personal message before signing.
pub const PERSONAL_MESSAGE_DOMAIN: &[u8] = b"ticketproof/personal-message/v1\0";

/// Length of a serialized Ed25519 signature.
pub const SERIALIZED_SIGNATURE_LEN: usize = 1 + 64 + 32;

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Derive the address controlled by this key.
    pub fn to_address(&self) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[ED25519_FLAG]);
        hasher.update(&self.0);
        Address(*hasher.finalize().as_bytes())
    }

    /// Verify a raw signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CoreError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;

        let sig = Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

/// A holder identity: Blake3 of the scheme flag and public key.
///
/// Rendered as `0x` followed by 64 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string (without prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{}...)", &self.to_hex()[..16])
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| CoreError::InvalidAddress(format!("missing 0x prefix: {s}")))?;

        if digits.len() != 64 {
            return Err(CoreError::InvalidAddress(format!(
                "expected 64 hex digits, got {}",
                digits.len()
            )));
        }
        if digits.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(CoreError::InvalidAddress("address must be lowercase".into()));
        }

        let bytes = hex::decode(digits).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A serialized signature as carried on the wire: base64 of
/// `flag || signature || public key`.
///
/// The text is kept as received. Parsing happens only at verification time
/// so that a malformed signature is reported as a forgery instead of as an
/// unreadable record.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedSignature(String);

impl SerializedSignature {
    /// Serialize an Ed25519 signature together with its public key.
    pub fn ed25519(signature: &Ed25519Signature, public_key: &Ed25519PublicKey) -> Self {
        let mut bytes = Vec::with_capacity(SERIALIZED_SIGNATURE_LEN);
        bytes.push(ED25519_FLAG);
        bytes.extend_from_slice(&signature.0);
        bytes.extend_from_slice(&public_key.0);
        Self::from_bytes(&bytes)
    }

    /// Encode arbitrary bytes. No structural check is made.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Wrap wire text as received.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The wire text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the base64 text.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        STANDARD
            .decode(&self.0)
            .map_err(|e| CoreError::MalformedSignature(format!("base64: {e}")))
    }

    /// Split into signature and public key.
    pub fn parse(&self) -> Result<(Ed25519Signature, Ed25519PublicKey), CoreError> {
        let bytes = self.to_bytes()?;

        let (&flag, rest) = bytes
            .split_first()
            .ok_or_else(|| CoreError::MalformedSignature("empty".into()))?;

        if flag != ED25519_FLAG {
            return Err(CoreError::UnsupportedScheme(flag));
        }

        if bytes.len() != SERIALIZED_SIGNATURE_LEN {
            return Err(CoreError::MalformedSignature(format!(
                "expected {} bytes, got {}",
                SERIALIZED_SIGNATURE_LEN,
                bytes.len()
            )));
        }

        let mut sig = [0u8; 64];
        sig.copy_from_slice(&rest[..64]);
        let mut pk = [0u8; 32];
        pk.copy_from_slice(&rest[64..]);

        Ok((Ed25519Signature(sig), Ed25519PublicKey(pk)))
    }
}

impl fmt::Debug for SerializedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(16).collect();
        write!(f, "SerializedSignature({head}...)")
    }
}

/// The signer identity a proof claims, kept as received.
///
/// Like [`SerializedSignature`], the text is not parsed on decode. A claim
/// that is not the canonical rendering of an [`Address`] can never match a
/// recovered signer and is judged at verification time.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimedAddress(String);

impl ClaimedAddress {
    /// Wrap wire text as received.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The wire text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this claim names exactly `address`.
    pub fn matches(&self, address: &Address) -> bool {
        self.0 == address.to_string()
    }

    /// Parse into an [`Address`]. Only the canonical rendering parses.
    pub fn to_address(&self) -> Result<Address, CoreError> {
        self.0.parse()
    }
}

impl From<Address> for ClaimedAddress {
    fn from(address: Address) -> Self {
        Self(address.to_string())
    }
}

impl PartialEq<Address> for ClaimedAddress {
    fn eq(&self, other: &Address) -> bool {
        self.matches(other)
    }
}

impl PartialEq<ClaimedAddress> for Address {
    fn eq(&self, other: &ClaimedAddress) -> bool {
        other.matches(self)
    }
}

impl fmt::Display for ClaimedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ClaimedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(18).collect();
        write!(f, "ClaimedAddress({head}...)")
    }
}

/// Build the exact bytes signed for a personal message.
pub fn personal_message_input(message: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(PERSONAL_MESSAGE_DOMAIN.len() + message.len());
    buf.extend_from_slice(PERSONAL_MESSAGE_DOMAIN);
    buf.extend_from_slice(message);
    buf
}

/// Verify a personal-message signature and recover the signing key.
pub fn verify_personal_message(
    message: &[u8],
    signature: &SerializedSignature,
) -> Result<Ed25519PublicKey, CoreError> {
    let (sig, public_key) = signature.parse()?;
    public_key.verify(&personal_message_input(message), &sig)?;
    Ok(public_key)
}

/// A keypair held by a ticket holder.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Get the address controlled by this keypair.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Sign raw bytes.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }

    /// Sign a personal message and serialize it with the public key.
    pub fn sign_personal_message(&self, message: &[u8]) -> SerializedSignature {
        let sig = self.sign(&personal_message_input(message));
        SerializedSignature::ed25519(&sig, &self.public_key())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message);

        keypair
            .public_key()
            .verify(message, &signature)
            .expect("valid signature should verify");

        let tampered = b"hello worlD";
        assert!(keypair.public_key().verify(tampered, &signature).is_err());
    }

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_personal_message_recovers_key() {
        let keypair = Keypair::from_seed(&[0x07; 32]);
        let serialized = keypair.sign_personal_message(b"check in");

        let recovered = verify_personal_message(b"check in", &serialized).unwrap();
        assert_eq!(recovered, keypair.public_key());
        assert_eq!(recovered.to_address(), keypair.address());
    }

    #[test]
    fn test_personal_message_is_domain_separated() {
        let keypair = Keypair::from_seed(&[0x07; 32]);
        let raw = keypair.sign(b"check in");
        let serialized = SerializedSignature::ed25519(&raw, &keypair.public_key());

        // A raw signature over the bare message must not pass as a personal message.
        assert!(verify_personal_message(b"check in", &serialized).is_err());
    }

    #[test]
    fn test_serialized_signature_layout() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let serialized = keypair.sign_personal_message(b"m");
        let bytes = serialized.to_bytes().unwrap();

        assert_eq!(bytes.len(), SERIALIZED_SIGNATURE_LEN);
        assert_eq!(bytes[0], ED25519_FLAG);
        assert_eq!(&bytes[65..], keypair.public_key().as_bytes());
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let keypair = Keypair::from_seed(&[0x01; 32]);
        let mut bytes = keypair.sign_personal_message(b"m").to_bytes().unwrap();
        bytes[0] = 0x01;

        let result = SerializedSignature::from_bytes(&bytes).parse();
        assert!(matches!(result, Err(CoreError::UnsupportedScheme(0x01))));
    }

    #[test]
    fn test_parse_rejects_bad_length_and_text() {
        let short = SerializedSignature::from_bytes(&[ED25519_FLAG, 1, 2, 3]);
        assert!(matches!(short.parse(), Err(CoreError::MalformedSignature(_))));

        let garbage = SerializedSignature::from_text("not base64 !!");
        assert!(matches!(garbage.parse(), Err(CoreError::MalformedSignature(_))));

        let empty = SerializedSignature::from_text("");
        assert!(matches!(empty.parse(), Err(CoreError::MalformedSignature(_))));
    }

    #[test]
    fn test_address_string_roundtrip() {
        let address = Keypair::from_seed(&[0x42; 32]).address();
        let text = address.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 66);

        let parsed: Address = text.parse().unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_address_parse_errors() {
        assert!("abcd".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!(format!("0x{}", "AB".repeat(32)).parse::<Address>().is_err());
        assert!(format!("0x{}", "zz".repeat(32)).parse::<Address>().is_err());
    }

    #[test]
    fn test_address_serde_as_string() {
        let address = Keypair::from_seed(&[0x11; 32]).address();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", address));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn test_claimed_address_keeps_wire_text() {
        let address = Keypair::from_seed(&[0x11; 32]).address();
        let canonical = ClaimedAddress::from(address);
        assert!(canonical.matches(&address));
        assert_eq!(canonical.to_address().unwrap(), address);

        let upper = ClaimedAddress::from_text(format!("0x{}", address.to_hex().to_uppercase()));
        assert!(!upper.matches(&address));
        assert!(upper.to_address().is_err());

        let json = serde_json::to_string(&ClaimedAddress::from_text("0xdeadbeef")).unwrap();
        let back: ClaimedAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "0xdeadbeef");
        assert!(!back.matches(&address));
    }
}
