// Path: crates/core/src/map_file.rs

//! The map file codec.
//!
//! A map file is the deflate-compressed canonical JSON batch container a
//! ledger transaction anchors:
//!
//! ```json
//! {
//!   "chunks": [{ "chunk_file_uri": "..." }],
//!   "operations": { "update": [{ "did_suffix": "...", "signed_data": "..." }] }
//! }
//! ```
//!
//! Its parsing rules govern which update operations can ever reach the
//! store, so validation is deliberately exact: one unknown property, one
//! malformed entry or one duplicated DID rejects the whole batch with a
//! distinct error code.

use crate::compress::{self, InflateFailure};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use trellis_types::config::ProtocolConfig;
use trellis_types::did::DidSuffix;
use trellis_types::error::MapFileError;

/// Reference to the batch's single chunk file.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct ChunkEntry {
    /// CAS URI of the chunk file carrying the batch's deltas.
    pub chunk_file_uri: String,
}

/// One update operation reference inside a map file.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct UpdateReference {
    /// The DID the referenced update acts on.
    pub did_suffix: DidSuffix,
    /// The update's compact JWS, verbatim.
    pub signed_data: String,
}

/// The optional `operations` property of a map file.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct MapFileOperations {
    /// Update references, in batch order.
    pub update: Vec<UpdateReference>,
}

/// A parsed map file.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct MapFile {
    /// Chunk references. Exactly one element.
    pub chunks: Vec<ChunkEntry>,
    /// Update references; omitted entirely when the batch has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<MapFileOperations>,
}

impl MapFile {
    /// Decompresses, parses and validates a map file.
    pub fn parse(compressed: &[u8], config: &ProtocolConfig) -> Result<Self, MapFileError> {
        let bytes = compress::inflate_bounded(compressed, config.max_map_file_bytes).map_err(
            |failure| match failure {
                InflateFailure::Malformed => MapFileError::MapFileDecompressionFailure,
                InflateFailure::TooLarge => MapFileError::MapFileExceedsMaximumSize {
                    max: config.max_map_file_bytes,
                },
            },
        )?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|_| MapFileError::MapFileNotJson)?;
        let Value::Object(map) = value else {
            return Err(MapFileError::MapFileNotJson);
        };

        if map.keys().any(|k| k != "chunks" && k != "operations") {
            return Err(MapFileError::MapFileHasUnknownProperty);
        }

        let chunks = Self::validate_chunks(&map)?;
        let operations = match map.get("operations") {
            None => None,
            Some(value) => Some(Self::validate_operations(value)?),
        };

        Ok(Self { chunks, operations })
    }

    fn validate_chunks(map: &Map<String, Value>) -> Result<Vec<ChunkEntry>, MapFileError> {
        let entries = map
            .get("chunks")
            .and_then(Value::as_array)
            .ok_or(MapFileError::MapFileChunksPropertyMissingOrIncorrectType)?;
        if entries.len() != 1 {
            return Err(MapFileError::MapFileChunksPropertyDoesNotHaveExactlyOneElement);
        }
        entries
            .iter()
            .map(|entry| {
                serde_json::from_value::<ChunkEntry>(entry.clone())
                    .map_err(|_| MapFileError::MapFileChunkHasMissingOrUnknownProperty)
            })
            .collect()
    }

    fn validate_operations(value: &Value) -> Result<MapFileOperations, MapFileError> {
        let Value::Object(inner) = value else {
            return Err(MapFileError::MapFileOperationsPropertyHasMissingOrUnknownProperty);
        };
        if inner.len() != 1 || !inner.contains_key("update") {
            return Err(MapFileError::MapFileOperationsPropertyHasMissingOrUnknownProperty);
        }
        let updates = inner
            .get("update")
            .and_then(Value::as_array)
            .ok_or(MapFileError::MapFileUpdatePropertyNotArray)?;

        let mut seen = HashSet::new();
        let update = updates
            .iter()
            .map(|entry| {
                let reference: UpdateReference = serde_json::from_value(entry.clone())
                    .map_err(|_| MapFileError::MapFileUpdateOperationMissingOrUnknownProperty)?;
                if !seen.insert(reference.did_suffix.clone()) {
                    return Err(MapFileError::MapFileMultipleOperationsForTheSameDid);
                }
                Ok(reference)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MapFileOperations { update })
    }

    /// Builds the compressed map file for a batch.
    ///
    /// Produces the same shape `parse` accepts and omits `operations`
    /// entirely when there are no updates. The writer-side duplicate
    /// check mirrors the parser so a batch writer can never anchor a file
    /// its own ingester would reject.
    pub fn build(
        chunk_file_uri: &str,
        updates: Vec<UpdateReference>,
    ) -> Result<Vec<u8>, MapFileError> {
        let mut seen = HashSet::new();
        for reference in &updates {
            if !seen.insert(reference.did_suffix.clone()) {
                return Err(MapFileError::MapFileMultipleOperationsForTheSameDid);
            }
        }
        let file = Self {
            chunks: vec![ChunkEntry {
                chunk_file_uri: chunk_file_uri.to_owned(),
            }],
            operations: if updates.is_empty() {
                None
            } else {
                Some(MapFileOperations { update: updates })
            },
        };
        let canonical = trellis_crypto::canonicalize(&file)
            .map_err(|e| MapFileError::MapFileCompressionFailure(e.to_string()))?;
        compress::deflate(&canonical)
            .map_err(|e| MapFileError::MapFileCompressionFailure(e.to_string()))
    }

    /// The batch's update references, empty when `operations` is absent.
    pub fn updates(&self) -> &[UpdateReference] {
        self.operations
            .as_ref()
            .map(|ops| ops.update.as_slice())
            .unwrap_or_default()
    }

    /// The URI of the batch's chunk file.
    pub fn chunk_file_uri(&self) -> Option<&str> {
        self.chunks.first().map(|c| c.chunk_file_uri.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trellis_types::error::ErrorCode;

    fn config() -> ProtocolConfig {
        ProtocolConfig::default()
    }

    fn compress_json(value: &Value) -> Vec<u8> {
        crate::compress::deflate(&serde_json::to_vec(value).unwrap()).unwrap()
    }

    fn reference(suffix: &str) -> UpdateReference {
        UpdateReference {
            did_suffix: DidSuffix::from(suffix),
            signed_data: "e30.e30.e30".into(),
        }
    }

    #[test]
    fn roundtrip_preserves_chunk_uri_and_updates() {
        let updates = vec![reference("did-a"), reference("did-b")];
        let compressed = MapFile::build("chunk-uri-1", updates.clone()).unwrap();
        let parsed = MapFile::parse(&compressed, &config()).unwrap();
        assert_eq!(parsed.chunk_file_uri(), Some("chunk-uri-1"));
        assert_eq!(parsed.updates(), updates.as_slice());
    }

    #[test]
    fn build_omits_operations_when_empty() {
        let compressed = MapFile::build("chunk-uri-1", vec![]).unwrap();
        let parsed = MapFile::parse(&compressed, &config()).unwrap();
        assert!(parsed.operations.is_none());
        assert!(parsed.updates().is_empty());
    }

    #[test]
    fn garbage_is_a_decompression_failure() {
        let err = MapFile::parse(b"definitely not deflate", &config()).unwrap_err();
        assert_eq!(err.code(), "MapFileDecompressionFailure");
    }

    #[test]
    fn non_json_content_is_rejected() {
        let compressed = crate::compress::deflate(b"plain text").unwrap();
        let err = MapFile::parse(&compressed, &config()).unwrap_err();
        assert_eq!(err.code(), "MapFileNotJson");
    }

    #[test]
    fn unknown_top_level_property_is_rejected() {
        let compressed = compress_json(&json!({
            "chunks": [{"chunk_file_uri": "x"}],
            "surprise": true,
        }));
        let err = MapFile::parse(&compressed, &config()).unwrap_err();
        assert_eq!(err.code(), "MapFileHasUnknownProperty");
    }

    #[test]
    fn chunks_shape_violations_have_distinct_codes() {
        let missing = compress_json(&json!({}));
        assert_eq!(
            MapFile::parse(&missing, &config()).unwrap_err().code(),
            "MapFileChunksPropertyMissingOrIncorrectType"
        );

        let not_array = compress_json(&json!({"chunks": "nope"}));
        assert_eq!(
            MapFile::parse(&not_array, &config()).unwrap_err().code(),
            "MapFileChunksPropertyMissingOrIncorrectType"
        );

        let two = compress_json(&json!({
            "chunks": [{"chunk_file_uri": "a"}, {"chunk_file_uri": "b"}],
        }));
        assert_eq!(
            MapFile::parse(&two, &config()).unwrap_err().code(),
            "MapFileChunksPropertyDoesNotHaveExactlyOneElement"
        );

        let bad_entry = compress_json(&json!({
            "chunks": [{"chunk_file_uri": "a", "extra": 1}],
        }));
        assert_eq!(
            MapFile::parse(&bad_entry, &config()).unwrap_err().code(),
            "MapFileChunkHasMissingOrUnknownProperty"
        );
    }

    #[test]
    fn operations_shape_violations_have_distinct_codes() {
        let wrong_inner = compress_json(&json!({
            "chunks": [{"chunk_file_uri": "a"}],
            "operations": {"create": []},
        }));
        assert_eq!(
            MapFile::parse(&wrong_inner, &config()).unwrap_err().code(),
            "MapFileOperationsPropertyHasMissingOrUnknownProperty"
        );

        let not_array = compress_json(&json!({
            "chunks": [{"chunk_file_uri": "a"}],
            "operations": {"update": 5},
        }));
        assert_eq!(
            MapFile::parse(&not_array, &config()).unwrap_err().code(),
            "MapFileUpdatePropertyNotArray"
        );

        let bad_entry = compress_json(&json!({
            "chunks": [{"chunk_file_uri": "a"}],
            "operations": {"update": [{"did_suffix": "d"}]},
        }));
        assert_eq!(
            MapFile::parse(&bad_entry, &config()).unwrap_err().code(),
            "MapFileUpdateOperationMissingOrUnknownProperty"
        );
    }

    #[test]
    fn duplicate_did_suffix_is_rejected() {
        let compressed = compress_json(&json!({
            "chunks": [{"chunk_file_uri": "a"}],
            "operations": {"update": [
                {"did_suffix": "same", "signed_data": "a.b.c"},
                {"did_suffix": "same", "signed_data": "d.e.f"},
            ]},
        }));
        let err = MapFile::parse(&compressed, &config()).unwrap_err();
        assert_eq!(err.code(), "MapFileMultipleOperationsForTheSameDid");

        let err = MapFile::build("a", vec![reference("same"), reference("same")]).unwrap_err();
        assert_eq!(err.code(), "MapFileMultipleOperationsForTheSameDid");
    }

    #[test]
    fn oversized_map_file_is_rejected() {
        let tight = ProtocolConfig {
            max_map_file_bytes: 8,
            ..ProtocolConfig::default()
        };
        let compressed = MapFile::build("chunk-uri-1", vec![reference("did-a")]).unwrap();
        let err = MapFile::parse(&compressed, &tight).unwrap_err();
        assert_eq!(err.code(), "MapFileExceedsMaximumSize");
    }
}
