//! Typed IDs for type-safe entity references.
//!
//! Wallet ids are supplied by callers; audit record ids are minted when a
//! record is appended. Keeping them as distinct types stops one from being
//! passed where the other is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }

            /// Returns true for the all-zero UUID.
            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(WalletId, "Caller-supplied identifier of a wallet.");
typed_id!(AuditRecordId, "Unique identifier for an audit record.");

impl AuditRecordId {
    /// Creates a new time-ordered ID (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_wallet_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = WalletId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(WalletId::from(uuid), id);
    }

    #[test]
    fn test_wallet_id_display_and_parse() {
        let uuid = Uuid::new_v4();
        let id = WalletId::from_str(&uuid.to_string()).unwrap();
        assert_eq!(id.to_string(), uuid.to_string());
        assert!(WalletId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_nil_detection() {
        assert!(WalletId::from_uuid(Uuid::nil()).is_nil());
        assert!(!WalletId::from_uuid(Uuid::new_v4()).is_nil());
    }

    #[test]
    fn test_audit_ids_are_v7() {
        let first = AuditRecordId::generate();
        let second = AuditRecordId::generate();
        assert_ne!(first, second);
        assert_eq!(first.into_inner().get_version_num(), 7);
    }

    #[test]
    fn test_serde_is_transparent() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&WalletId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
