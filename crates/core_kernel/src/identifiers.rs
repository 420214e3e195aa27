//! Strongly-typed identifiers for lodging entities
//!
//! Newtype wrappers around UUIDs keep a `RoomId` from being passed where a
//! `ReservationId` is expected. Identifiers are never minted implicitly on
//! persistence; callers obtain fresh UUIDs from an [`IdGenerator`] and wrap
//! them before anything is written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Mints an identifier from the given generator
            pub fn generate(ids: &dyn IdGenerator) -> Self {
                Self(ids.next_uuid())
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(RoomTypeId, "RTY");
define_id!(RoomId, "ROOM");
define_id!(CustomerId, "CUS");
define_id!(ReservationId, "RSV");
define_id!(BillId, "BILL");
define_id!(LineItemId, "LINE");
define_id!(PaymentId, "PAY");

/// Source of unique identifiers for new entities
///
/// Injected into the lifecycle coordinator so tests can pin identifiers and
/// deployments can choose the UUID flavour once.
pub trait IdGenerator: Send + Sync {
    /// Returns a UUID never returned before by this generator
    fn next_uuid(&self) -> Uuid;
}

/// Default generator producing time-ordered v7 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_uuid(&self) -> Uuid {
        Uuid::now_v7()
    }
}
