// Path: crates/types/src/config.rs

//! Protocol parameters enforced by parsers and codecs.
//!
//! One `ProtocolConfig` belongs to one protocol epoch; the version manager
//! hands the matching operation processor (and with it, these limits) to
//! the resolver per anchored transaction time.

use serde::Deserialize;

/// Multihash code for SHA2-256, the default commitment hash.
pub const MULTIHASH_SHA2_256: u64 = 0x12;

fn default_hash_algorithm_code() -> u64 {
    MULTIHASH_SHA2_256
}

fn default_max_operation_bytes() -> usize {
    2500
}

fn default_max_map_file_bytes() -> usize {
    1_048_576
}

fn default_max_chunk_file_bytes() -> usize {
    10_485_760
}

fn default_max_operations_per_batch() -> u64 {
    10_000
}

/// Tunable limits and algorithm choices of one protocol epoch.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case", default)]
pub struct ProtocolConfig {
    /// Multihash algorithm code used for commitments and CIDs.
    pub hash_algorithm_code: u64,
    /// Maximum size of a single anchored operation in bytes.
    pub max_operation_bytes: usize,
    /// Maximum decompressed size of a map file in bytes.
    pub max_map_file_bytes: usize,
    /// Maximum decompressed size of a chunk file in bytes.
    pub max_chunk_file_bytes: usize,
    /// Maximum number of operations a single batch may declare.
    pub max_operations_per_batch: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            hash_algorithm_code: default_hash_algorithm_code(),
            max_operation_bytes: default_max_operation_bytes(),
            max_map_file_bytes: default_max_map_file_bytes(),
            max_chunk_file_bytes: default_max_chunk_file_bytes(),
            max_operations_per_batch: default_max_operations_per_batch(),
        }
    }
}
