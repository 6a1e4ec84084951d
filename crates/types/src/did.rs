// Path: crates/types/src/did.rs

//! Defines the canonical `DidSuffix` identifier.
//!
//! The suffix is the content-addressed hash of a DID's initial suffix data
//! and remains constant for the lifetime of the DID, across any number of
//! key rotations and recoveries. It is the sole key under which operations
//! are stored and resolved.

use serde::{Deserialize, Serialize};

/// The unique, stable identifier of a DID.
///
/// Derived as the encoded multihash of the canonicalized initial suffix
/// data; opaque to everything but the hash check performed when a create
/// operation is applied.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[serde(transparent)]
pub struct DidSuffix(pub String);

impl DidSuffix {
    /// Returns the suffix as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DidSuffix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for DidSuffix {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DidSuffix {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl core::fmt::Display for DidSuffix {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
