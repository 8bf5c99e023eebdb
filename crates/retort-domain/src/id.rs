//! Stable identities for persisted entities
//!
//! Every entity kind gets its own newtype over a UUIDv7 so that a
//! `CompoundId` can never be passed where a `SynthesisRouteId` is expected.
//! UUIDv7 keeps ids chronologically sortable, which the store relies on for
//! creation-order tie-breaks.

use std::fmt;

/// Error returned when an id string is not a valid UUID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError(String);

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid id: {}", self.0)
    }
}

impl std::error::Error for IdParseError {}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based id
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create an id from a raw u128 value
            ///
            /// This is primarily for storage layer deserialization.
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }

            /// Big-endian byte form used as the storage key
            pub fn to_bytes(&self) -> [u8; 16] {
                self.0.to_be_bytes()
            }

            /// Rebuild an id from its big-endian byte form
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdParseError> {
                let arr: [u8; 16] = bytes.try_into().map_err(|_| {
                    IdParseError(format!("expected 16 bytes, got {}", bytes.len()))
                })?;
                Ok(Self(u128::from_be_bytes(arr)))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| IdParseError(format!("{}: {}", s, e)))
            }
        }
    };
}

entity_id!(
    /// Identifier of a persisted [`Paper`](crate::Paper)
    PaperId
);

entity_id!(
    /// Identifier of a persisted [`Compound`](crate::Compound)
    CompoundId
);

entity_id!(
    /// Identifier of a persisted [`SynthesisRoute`](crate::SynthesisRoute)
    SynthesisRouteId
);
