// Path: crates/core/src/chunk_file.rs

//! The chunk file codec.
//!
//! The chunk file carries the deltas a map file's update references point
//! at, one per reference in batch order:
//!
//! ```json
//! { "deltas": [ ... ] }
//! ```
//!
//! Deltas are kept as raw JSON values here. The hash binding an update's
//! signed `delta_hash` asserts is over the delta exactly as anchored, so
//! re-typing it before the operation parser has checked that binding would
//! destroy evidence.

use crate::compress::{self, InflateFailure};
use serde_json::Value;
use trellis_types::config::ProtocolConfig;
use trellis_types::error::ChunkFileError;

/// A parsed chunk file.
#[derive(Clone, PartialEq, Debug)]
pub struct ChunkFile {
    /// The batch's deltas, in update order, untyped.
    pub deltas: Vec<Value>,
}

impl ChunkFile {
    /// Decompresses, parses and validates a chunk file.
    pub fn parse(compressed: &[u8], config: &ProtocolConfig) -> Result<Self, ChunkFileError> {
        let bytes = compress::inflate_bounded(compressed, config.max_chunk_file_bytes).map_err(
            |failure| match failure {
                InflateFailure::Malformed => ChunkFileError::ChunkFileDecompressionFailure,
                InflateFailure::TooLarge => ChunkFileError::ChunkFileExceedsMaximumSize {
                    max: config.max_chunk_file_bytes,
                },
            },
        )?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|_| ChunkFileError::ChunkFileNotJson)?;
        let Value::Object(map) = value else {
            return Err(ChunkFileError::ChunkFileNotJson);
        };
        if map.len() != 1 || !map.contains_key("deltas") {
            return Err(ChunkFileError::ChunkFileHasUnknownProperty);
        }
        let deltas = map
            .get("deltas")
            .and_then(Value::as_array)
            .ok_or(ChunkFileError::ChunkFileDeltasPropertyNotArray)?
            .clone();
        Ok(Self { deltas })
    }

    /// Builds the compressed chunk file for a batch.
    pub fn build(deltas: Vec<Value>) -> Result<Vec<u8>, ChunkFileError> {
        let file = serde_json::json!({ "deltas": deltas });
        let canonical = trellis_crypto::canonicalize(&file)
            .map_err(|e| ChunkFileError::ChunkFileCompressionFailure(e.to_string()))?;
        compress::deflate(&canonical)
            .map_err(|e| ChunkFileError::ChunkFileCompressionFailure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trellis_types::error::ErrorCode;

    #[test]
    fn roundtrip_preserves_deltas_verbatim() {
        let deltas = vec![
            json!({"patches": [], "update_commitment": "EiA"}),
            json!({"unknown": "shape kept as-is"}),
        ];
        let compressed = ChunkFile::build(deltas.clone()).unwrap();
        let parsed = ChunkFile::parse(&compressed, &ProtocolConfig::default()).unwrap();
        assert_eq!(parsed.deltas, deltas);
    }

    #[test]
    fn shape_violations_have_distinct_codes() {
        let config = ProtocolConfig::default();

        let err = ChunkFile::parse(b"not deflate", &config).unwrap_err();
        assert_eq!(err.code(), "ChunkFileDecompressionFailure");

        let not_json = crate::compress::deflate(b"free text").unwrap();
        assert_eq!(
            ChunkFile::parse(&not_json, &config).unwrap_err().code(),
            "ChunkFileNotJson"
        );

        let extra = crate::compress::deflate(br#"{"deltas":[],"x":1}"#).unwrap();
        assert_eq!(
            ChunkFile::parse(&extra, &config).unwrap_err().code(),
            "ChunkFileHasUnknownProperty"
        );

        let not_array = crate::compress::deflate(br#"{"deltas":{}}"#).unwrap();
        assert_eq!(
            ChunkFile::parse(&not_array, &config).unwrap_err().code(),
            "ChunkFileDeltasPropertyNotArray"
        );
    }
}
