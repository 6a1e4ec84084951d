// Path: crates/types/src/anchor.rs

//! Anchor strings, content identifiers and ledger transaction records.
//!
//! A ledger transaction carries an anchor string of the form
//! `{operation_count}.{map_file_cid}`. Parsing it here, in the base types
//! crate, keeps the single source of truth for the format next to the data
//! it produces.

use crate::error::IngestError;
use serde::{Deserialize, Serialize};

/// A content identifier: the base64url-encoded multihash of the content.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[serde(transparent)]
pub struct Cid(pub String);

impl Cid {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Cid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl core::fmt::Display for Cid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One anchoring transaction as yielded by the ledger adapter.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct LedgerTransaction {
    /// The anchor string embedded in the ledger transaction.
    pub anchor_string: String,
    /// Ledger time (block height) of the transaction.
    pub transaction_time: u64,
    /// Position of the transaction within its ledger time.
    pub transaction_number: u64,
}

/// The decoded contents of an anchor string.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AnchoredData {
    /// Number of operations the batch declares.
    pub operation_count: u64,
    /// CID of the batch's map file.
    pub map_file_cid: Cid,
}

impl AnchoredData {
    /// Parses `{operation_count}.{map_file_cid}`.
    ///
    /// The count must be a positive decimal with no sign or leading zeros
    /// beyond a bare `0`; the CID must be non-empty. Everything else is an
    /// [`IngestError::AnchorStringInvalidFormat`].
    pub fn parse(anchor_string: &str) -> Result<Self, IngestError> {
        let Some((count_str, cid_str)) = anchor_string.split_once('.') else {
            return Err(IngestError::AnchorStringInvalidFormat(
                anchor_string.to_owned(),
            ));
        };
        if cid_str.is_empty() || cid_str.contains('.') {
            return Err(IngestError::AnchorStringInvalidFormat(
                anchor_string.to_owned(),
            ));
        }
        let has_leading_zero = count_str.len() > 1 && count_str.starts_with('0');
        let operation_count: u64 = count_str
            .parse()
            .ok()
            .filter(|_| !has_leading_zero && count_str.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| IngestError::AnchorStringInvalidFormat(anchor_string.to_owned()))?;
        if operation_count == 0 {
            return Err(IngestError::AnchorStringOperationCountInvalid(
                operation_count,
            ));
        }
        Ok(Self {
            operation_count,
            map_file_cid: Cid::from(cid_str),
        })
    }

    /// Serializes back to the `{operation_count}.{map_file_cid}` form.
    pub fn to_anchor_string(&self) -> String {
        format!("{}.{}", self.operation_count, self.map_file_cid)
    }
}
