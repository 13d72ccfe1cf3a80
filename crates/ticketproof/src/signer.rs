//! Signer: the holder's signing capability.
//!
//! The holder's keys live outside this crate (a wallet, a hardware device,
//! a remote signing service). The protocol only needs two things from
//! them: which account is active, and a personal-message signature over a
//! given message from that account.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use ticketproof_core::{Address, Keypair, SerializedSignature};
use tracing::debug;

/// Errors a signer can report.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The holder declined the request.
    #[error("holder declined the signature request")]
    Rejected,

    /// The requested account is not controlled by this signer.
    #[error("account {0} is not available to this signer")]
    UnknownAccount(Address),

    /// The signer could not be reached or failed internally.
    #[error("signer transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

/// The Signer trait: an injected signing capability.
///
/// `sign` may suspend for as long as the holder takes to respond; callers
/// must not assume it is bounded.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The account currently able to sign, if any.
    async fn active_account(&self) -> Option<Address>;

    /// Produce a personal-message signature over `message` from `account`.
    async fn sign(
        &self,
        message: &[u8],
        account: &Address,
    ) -> Result<SerializedSignature, SignerError>;
}

/// A signer backed by a local Ed25519 keypair.
///
/// Can be told to decline requests or to report no active account, which
/// is how a disconnected or unwilling holder looks to the protocol.
pub struct KeypairSigner {
    keypair: Keypair,
    declining: AtomicBool,
    disconnected: AtomicBool,
}

impl KeypairSigner {
    /// Create a signer for a keypair.
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair,
            declining: AtomicBool::new(false),
            disconnected: AtomicBool::new(false),
        }
    }

    /// The signer's account.
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    /// Decline (or stop declining) every signature request.
    pub fn set_declining(&self, declining: bool) {
        self.declining.store(declining, Ordering::SeqCst);
    }

    /// Report (or stop reporting) no active account.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.disconnected.store(disconnected, Ordering::SeqCst);
    }
}

#[async_trait]
impl Signer for KeypairSigner {
    async fn active_account(&self) -> Option<Address> {
        if self.disconnected.load(Ordering::SeqCst) {
            return None;
        }
        Some(self.keypair.address())
    }

    async fn sign(
        &self,
        message: &[u8],
        account: &Address,
    ) -> Result<SerializedSignature, SignerError> {
        if *account != self.keypair.address() {
            return Err(SignerError::UnknownAccount(*account));
        }
        if self.declining.load(Ordering::SeqCst) {
            debug!(%account, "declining signature request");
            return Err(SignerError::Rejected);
        }
        Ok(self.keypair.sign_personal_message(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketproof_core::verify_personal_message;

    fn signer() -> KeypairSigner {
        KeypairSigner::new(Keypair::from_seed(&[0x42; 32]))
    }

    #[tokio::test]
    async fn test_sign_verifies() {
        let signer = signer();
        let account = signer.active_account().await.unwrap();

        let signature = signer.sign(b"hello", &account).await.unwrap();
        let public_key = verify_personal_message(b"hello", &signature).unwrap();
        assert_eq!(public_key.to_address(), account);
    }

    #[tokio::test]
    async fn test_declining() {
        let signer = signer();
        signer.set_declining(true);

        let result = signer.sign(b"hello", &signer.address()).await;
        assert!(matches!(result, Err(SignerError::Rejected)));
    }

    #[tokio::test]
    async fn test_disconnected() {
        let signer = signer();
        signer.set_disconnected(true);
        assert!(signer.active_account().await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let signer = signer();
        let other = Keypair::from_seed(&[0x43; 32]).address();

        let result = signer.sign(b"hello", &other).await;
        assert!(matches!(result, Err(SignerError::UnknownAccount(a)) if a == other));
    }
}
