//! Strong type definitions for ticket proofs.
//!
//! All identifiers are newtypes to prevent misuse at compile time. They are
//! opaque strings owned by external systems (the ledger mints tickets and
//! events, the durable store assigns blob ids), so no format is imposed here.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the raw identifier.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id! {
    /// Identifier of a ticket instance on the ledger.
    TicketId
}

string_id! {
    /// Identifier of the event a ticket belongs to.
    EventId
}

string_id! {
    /// Content reference of a blob in the durable store.
    BlobId
}

string_id! {
    /// Identifier of a ledger container (the holding structure whose
    /// membership set proves ownership).
    ContainerId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_id_display() {
        let id = TicketId::new("0xabc");
        assert_eq!(format!("{}", id), "0xabc");
        assert_eq!(format!("{:?}", id), "TicketId(0xabc)");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = BlobId::from("blob-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"blob-1\"");

        let back: BlobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
