//! Identifier and key wrappers.
//!
//! Raw simulation handles are plain integers issued by the event source.
//! They are only meaningful while the underlying object is alive, so they
//! never index counters directly. Counters are indexed by string keys
//! ([`AggregationKey`], [`GroupKey`]) derived once by the identity layer.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// The sentinel the actor database uses for "no identity on record".
pub const UNRESOLVED_STABLE_ID: &str = "unresolved";

/// Generates a newtype wrapper around a raw `u64` simulation handle.
macro_rules! define_raw_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Return the inner integer value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

/// Generates a newtype wrapper around an owned `String` key.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a string as a key without further validation.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the key and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

define_raw_id! {
    /// Transient simulation handle of an actor, as carried by events.
    RawActorId
}

define_raw_id! {
    /// Transient simulation handle of a weapon object, as carried by events.
    RawWeaponId
}

define_key! {
    /// The string indexing one actor counter record for the whole session.
    AggregationKey
}

define_key! {
    /// The normalized string indexing one group counter record.
    GroupKey
}

/// An externally issued, persistent identity of a human-controlled actor.
///
/// Can only be constructed through [`StableId::parse`], which rejects empty
/// strings and the [`UNRESOLVED_STABLE_ID`] sentinel. Holding a `StableId`
/// therefore always means "usable as an aggregation key".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StableId(String);

impl StableId {
    /// Validate a raw identity string.
    ///
    /// Surrounding whitespace is trimmed. Returns `None` for empty input or
    /// the unresolved sentinel (compared case-insensitively).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNRESOLVED_STABLE_ID) {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for StableId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StableId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom("unusable stable identity"))
    }
}
