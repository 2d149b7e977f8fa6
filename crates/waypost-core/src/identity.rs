//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout Waypost.
//! Each identifier is a distinct type: you cannot pass a [`PackageId`]
//! where a [`TripId`] is expected. All identifiers are UUID-based and
//! therefore valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// A delivery package posted by a sender.
    PackageId
);

uuid_identifier!(
    /// A trip posted by a traveler with spare carrying capacity.
    TripId
);

uuid_identifier!(
    /// An authenticated user. Senders and travelers share one id space.
    UserId
);

uuid_identifier!(
    /// A communication channel provisioned for a committed pair.
    ChannelId
);

uuid_identifier!(
    /// A persisted safety confirmation record.
    ConfirmationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(PackageId::new(), PackageId::new());
    }

    #[test]
    fn from_uuid_preserves_value() {
        let raw = Uuid::new_v4();
        let id = TripId::from_uuid(raw);
        assert_eq!(id.as_uuid(), &raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let raw = Uuid::new_v4();
        let json = serde_json::to_string(&UserId::from(raw)).unwrap();
        assert_eq!(json, format!("\"{raw}\""));
    }
}
