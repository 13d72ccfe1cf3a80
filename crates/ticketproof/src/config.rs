//! Configuration for the issuing and scanning flows.
//!
//! Every struct has a `Default` matching the deployed protocol and derives
//! serde, so an application can load overrides from its own config file:
//!
//! ```rust
//! use ticketproof::TicketProofConfig;
//!
//! let config = TicketProofConfig::from_json(r#"{ "publish": { "retention_epochs": 5 } }"#).unwrap();
//! assert_eq!(config.publish.retention_epochs, 5);
//! assert!(config.publish.deletable);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ticketproof_store::{FetchConfig, PublishConfig};

/// Configuration for the verification audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Maximum distance between a proof's timestamp and now.
    pub freshness_window: Duration,
    /// Timeout for the whole ownership query.
    pub ledger_timeout: Duration,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(300),
            ledger_timeout: Duration::from_secs(10),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketProofConfig {
    /// Durable publish settings.
    pub publish: PublishConfig,
    /// Tiered fetch settings.
    pub fetch: FetchConfig,
    /// Verification settings.
    pub verify: VerifyConfig,
}

impl TicketProofConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Override publish settings.
    pub fn with_publish(mut self, publish: PublishConfig) -> Self {
        self.publish = publish;
        self
    }

    /// Override fetch settings.
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Override verification settings.
    pub fn with_verify(mut self, verify: VerifyConfig) -> Self {
        self.verify = verify;
        self
    }

    /// Override the freshness window.
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.verify.freshness_window = window;
        self
    }

    /// Override the retention period.
    pub fn with_retention_epochs(mut self, epochs: u32) -> Self {
        self.publish.retention_epochs = epochs;
        self
    }
}
