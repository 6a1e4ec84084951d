// Path: crates/types/src/error/mod.rs

//! Core error types for the Trellis DID kernel.
//!
//! Every rejection carries a machine-readable code drawn from a fixed
//! enumeration; the codes are part of the public surface, the message
//! text is not. Two strata exist: parse/ingest errors are raised as these
//! typed values and the offending input is discarded before it reaches
//! the store, while semantic failures at resolve time are swallowed by
//! the operation processor (which reports rejection as `None`, never as
//! an error).

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors from canonicalization, hashing, encoding and signature checks.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// JCS canonicalization of a value failed.
    #[error("canonicalization failed: {0}")]
    CanonicalizationFailed(String),
    /// The declared multihash algorithm is not supported by this epoch.
    #[error("unsupported multihash code: {0:#x}")]
    MultihashUnsupportedCode(u64),
    /// A multihash buffer did not have the self-describing shape.
    #[error("malformed multihash")]
    MultihashMalformed,
    /// A string that should be base64url was not.
    #[error("incorrectly encoded string")]
    EncodedStringIncorrectEncoding,
    /// The JWK `kty` is not one the protocol signs with.
    #[error("unsupported JWK key type: {0}")]
    JwkUnsupportedKeyType(String),
    /// The JWK `crv` is not one the protocol signs with.
    #[error("unsupported JWK curve: {0}")]
    JwkUnsupportedCurve(String),
    /// The JWK coordinates do not decode to a valid point or key.
    #[error("malformed JWK key material: {0}")]
    JwkMalformedKeyMaterial(String),
    /// A compact JWS did not have exactly three base64url segments.
    #[error("compact JWS has incorrect format")]
    JwsIncorrectCompactFormat,
    /// The JWS protected header was not `{ "alg": <supported> }`.
    #[error("invalid JWS protected header")]
    JwsProtectedHeaderInvalid,
    /// The JWS `alg` does not match the curve of the verifying key.
    #[error("JWS algorithm does not match verification key")]
    JwsAlgorithmMismatch,
    /// The JWS payload was not the expected JSON shape.
    #[error("JWS payload is not the expected JSON: {0}")]
    JwsPayloadNotJson(String),
    /// Cryptographic signature verification failed.
    #[error("JWS signature verification failed")]
    JwsSignatureInvalid,
    /// Producing a signature failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            Self::CanonicalizationFailed(_) => "CanonicalizationFailed",
            Self::MultihashUnsupportedCode(_) => "MultihashUnsupportedCode",
            Self::MultihashMalformed => "MultihashMalformed",
            Self::EncodedStringIncorrectEncoding => "EncodedStringIncorrectEncoding",
            Self::JwkUnsupportedKeyType(_) => "JwkUnsupportedKeyType",
            Self::JwkUnsupportedCurve(_) => "JwkUnsupportedCurve",
            Self::JwkMalformedKeyMaterial(_) => "JwkMalformedKeyMaterial",
            Self::JwsIncorrectCompactFormat => "JwsIncorrectCompactFormat",
            Self::JwsProtectedHeaderInvalid => "JwsProtectedHeaderInvalid",
            Self::JwsAlgorithmMismatch => "JwsAlgorithmMismatch",
            Self::JwsPayloadNotJson(_) => "JwsPayloadNotJson",
            Self::JwsSignatureInvalid => "JwsSignatureInvalid",
            Self::SigningFailed(_) => "SigningFailed",
        }
    }
}

/// Structural violations raised while parsing a single anchored operation.
///
/// Any of these at ingestion time drops the operation before it reaches
/// the store.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The raw operation exceeds the per-operation size limit.
    #[error("operation of {got} bytes exceeds maximum of {max}")]
    OperationExceedsMaximumSize {
        /// Observed size in bytes.
        got: usize,
        /// Configured limit in bytes.
        max: usize,
    },
    /// The operation bytes are not a JSON object.
    #[error("operation is not valid JSON: {0}")]
    OperationNotJson(String),
    /// The `type` property is absent or names an unknown kind.
    #[error("operation type missing or unknown")]
    OperationTypeMissingOrUnknown,
    /// The declared `type` disagrees with the kind the caller expected.
    #[error("operation type does not match anchored kind")]
    OperationTypeMismatch,
    /// A create operation's top-level property set is not exactly
    /// `{type, suffix_data, delta}`.
    #[error("create operation has a missing or unknown property")]
    CreateOperationMissingOrUnknownProperty,
    /// `suffix_data` is not exactly `{delta_hash, recovery_commitment}`.
    #[error("create operation suffix data has a missing or unknown property")]
    CreateOperationSuffixDataMissingOrUnknownProperty,
    /// The create delta does not hash to `suffix_data.delta_hash`.
    #[error("create operation delta does not match its declared hash")]
    CreateOperationDeltaHashMismatch,
    /// An update operation's top-level property set is not exactly
    /// `{type, did_suffix, signed_data, delta}`.
    #[error("update operation has a missing or unknown property")]
    UpdateOperationMissingOrUnknownProperty,
    /// The update JWS payload is not exactly `{update_key, delta_hash}`.
    #[error("update operation signed payload has a missing or unknown property")]
    UpdateOperationSignedPayloadMissingOrUnknownProperty,
    /// The update delta does not hash to the signed `delta_hash`.
    #[error("update operation delta does not match its signed hash")]
    UpdateOperationDeltaHashMismatch,
    /// A recover operation's top-level property set is not exactly
    /// `{type, did_suffix, signed_data, delta}`.
    #[error("recover operation has a missing or unknown property")]
    RecoverOperationMissingOrUnknownProperty,
    /// The recover JWS payload is not exactly
    /// `{recovery_key, recovery_commitment, delta_hash}`.
    #[error("recover operation signed payload has a missing or unknown property")]
    RecoverOperationSignedPayloadMissingOrUnknownProperty,
    /// The recover delta does not hash to the signed `delta_hash`.
    #[error("recover operation delta does not match its signed hash")]
    RecoverOperationDeltaHashMismatch,
    /// A deactivate operation's top-level property set is not exactly
    /// `{type, did_suffix, signed_data}`.
    #[error("deactivate operation has a missing or unknown property")]
    DeactivateOperationMissingOrUnknownProperty,
    /// The deactivate JWS payload is not exactly `{did_suffix, recovery_key}`.
    #[error("deactivate operation signed payload has a missing or unknown property")]
    DeactivateOperationSignedPayloadMissingOrUnknownProperty,
    /// The signed `did_suffix` disagrees with the operation's own.
    #[error("deactivate operation signed did suffix does not match")]
    DeactivateOperationDidSuffixMismatch,
    /// A cryptographic check failed during parsing.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl ErrorCode for OperationError {
    fn code(&self) -> &'static str {
        match self {
            Self::OperationExceedsMaximumSize { .. } => "OperationExceedsMaximumSize",
            Self::OperationNotJson(_) => "OperationNotJson",
            Self::OperationTypeMissingOrUnknown => "OperationTypeMissingOrUnknown",
            Self::OperationTypeMismatch => "OperationTypeMismatch",
            Self::CreateOperationMissingOrUnknownProperty => {
                "CreateOperationMissingOrUnknownProperty"
            }
            Self::CreateOperationSuffixDataMissingOrUnknownProperty => {
                "CreateOperationSuffixDataMissingOrUnknownProperty"
            }
            Self::CreateOperationDeltaHashMismatch => "CreateOperationDeltaHashMismatch",
            Self::UpdateOperationMissingOrUnknownProperty => {
                "UpdateOperationMissingOrUnknownProperty"
            }
            Self::UpdateOperationSignedPayloadMissingOrUnknownProperty => {
                "UpdateOperationSignedPayloadMissingOrUnknownProperty"
            }
            Self::UpdateOperationDeltaHashMismatch => "UpdateOperationDeltaHashMismatch",
            Self::RecoverOperationMissingOrUnknownProperty => {
                "RecoverOperationMissingOrUnknownProperty"
            }
            Self::RecoverOperationSignedPayloadMissingOrUnknownProperty => {
                "RecoverOperationSignedPayloadMissingOrUnknownProperty"
            }
            Self::RecoverOperationDeltaHashMismatch => "RecoverOperationDeltaHashMismatch",
            Self::DeactivateOperationMissingOrUnknownProperty => {
                "DeactivateOperationMissingOrUnknownProperty"
            }
            Self::DeactivateOperationSignedPayloadMissingOrUnknownProperty => {
                "DeactivateOperationSignedPayloadMissingOrUnknownProperty"
            }
            Self::DeactivateOperationDidSuffixMismatch => "DeactivateOperationDidSuffixMismatch",
            Self::Crypto(inner) => inner.code(),
        }
    }
}

/// Violations of the map file container format.
#[derive(Debug, Error)]
pub enum MapFileError {
    /// The buffer did not inflate.
    #[error("map file decompression failure")]
    MapFileDecompressionFailure,
    /// The inflated bytes exceed the configured limit.
    #[error("map file exceeds maximum size of {max} bytes")]
    MapFileExceedsMaximumSize {
        /// Configured limit in bytes.
        max: usize,
    },
    /// The inflated bytes are not a JSON object.
    #[error("map file is not JSON")]
    MapFileNotJson,
    /// A top-level property other than `chunks`/`operations` is present.
    #[error("map file has an unknown property")]
    MapFileHasUnknownProperty,
    /// `chunks` is absent or not an array.
    #[error("map file chunks property missing or of incorrect type")]
    MapFileChunksPropertyMissingOrIncorrectType,
    /// `chunks` does not contain exactly one element.
    #[error("map file chunks property does not have exactly one element")]
    MapFileChunksPropertyDoesNotHaveExactlyOneElement,
    /// The chunk entry is not exactly `{chunk_file_uri: string}`.
    #[error("map file chunk entry has a missing or unknown property")]
    MapFileChunkHasMissingOrUnknownProperty,
    /// `operations` holds a property other than `update`, or none.
    #[error("map file operations property has a missing or unknown property")]
    MapFileOperationsPropertyHasMissingOrUnknownProperty,
    /// `operations.update` is not an array.
    #[error("map file update property is not an array")]
    MapFileUpdatePropertyNotArray,
    /// An update entry is not exactly `{did_suffix, signed_data}`.
    #[error("map file update entry has a missing or unknown property")]
    MapFileUpdateOperationMissingOrUnknownProperty,
    /// Two update entries target the same DID.
    #[error("map file contains multiple operations for the same DID")]
    MapFileMultipleOperationsForTheSameDid,
    /// Deflating the container on the build path failed.
    #[error("map file compression failure: {0}")]
    MapFileCompressionFailure(String),
}

impl ErrorCode for MapFileError {
    fn code(&self) -> &'static str {
        match self {
            Self::MapFileDecompressionFailure => "MapFileDecompressionFailure",
            Self::MapFileExceedsMaximumSize { .. } => "MapFileExceedsMaximumSize",
            Self::MapFileNotJson => "MapFileNotJson",
            Self::MapFileHasUnknownProperty => "MapFileHasUnknownProperty",
            Self::MapFileChunksPropertyMissingOrIncorrectType => {
                "MapFileChunksPropertyMissingOrIncorrectType"
            }
            Self::MapFileChunksPropertyDoesNotHaveExactlyOneElement => {
                "MapFileChunksPropertyDoesNotHaveExactlyOneElement"
            }
            Self::MapFileChunkHasMissingOrUnknownProperty => {
                "MapFileChunkHasMissingOrUnknownProperty"
            }
            Self::MapFileOperationsPropertyHasMissingOrUnknownProperty => {
                "MapFileOperationsPropertyHasMissingOrUnknownProperty"
            }
            Self::MapFileUpdatePropertyNotArray => "MapFileUpdatePropertyNotArray",
            Self::MapFileUpdateOperationMissingOrUnknownProperty => {
                "MapFileUpdateOperationMissingOrUnknownProperty"
            }
            Self::MapFileMultipleOperationsForTheSameDid => {
                "MapFileMultipleOperationsForTheSameDid"
            }
            Self::MapFileCompressionFailure(_) => "MapFileCompressionFailure",
        }
    }
}

/// Violations of the chunk file container format.
#[derive(Debug, Error)]
pub enum ChunkFileError {
    /// The buffer did not inflate.
    #[error("chunk file decompression failure")]
    ChunkFileDecompressionFailure,
    /// The inflated bytes exceed the configured limit.
    #[error("chunk file exceeds maximum size of {max} bytes")]
    ChunkFileExceedsMaximumSize {
        /// Configured limit in bytes.
        max: usize,
    },
    /// The inflated bytes are not a JSON object.
    #[error("chunk file is not JSON")]
    ChunkFileNotJson,
    /// A top-level property other than `deltas` is present, or `deltas`
    /// is absent.
    #[error("chunk file has a missing or unknown property")]
    ChunkFileHasUnknownProperty,
    /// `deltas` is not an array.
    #[error("chunk file deltas property is not an array")]
    ChunkFileDeltasPropertyNotArray,
    /// The number of deltas disagrees with the batch's update count.
    #[error("chunk file holds {got} deltas but the batch declares {expected}")]
    ChunkFileDeltaCountMismatch {
        /// Deltas present in the chunk file.
        got: usize,
        /// Update entries declared by the map file.
        expected: usize,
    },
    /// Deflating the container on the build path failed.
    #[error("chunk file compression failure: {0}")]
    ChunkFileCompressionFailure(String),
}

impl ErrorCode for ChunkFileError {
    fn code(&self) -> &'static str {
        match self {
            Self::ChunkFileDecompressionFailure => "ChunkFileDecompressionFailure",
            Self::ChunkFileExceedsMaximumSize { .. } => "ChunkFileExceedsMaximumSize",
            Self::ChunkFileNotJson => "ChunkFileNotJson",
            Self::ChunkFileHasUnknownProperty => "ChunkFileHasUnknownProperty",
            Self::ChunkFileDeltasPropertyNotArray => "ChunkFileDeltasPropertyNotArray",
            Self::ChunkFileDeltaCountMismatch { .. } => "ChunkFileDeltaCountMismatch",
            Self::ChunkFileCompressionFailure(_) => "ChunkFileCompressionFailure",
        }
    }
}

/// Violations raised while validating or applying a document patch.
///
/// Any of these aborts the whole delta: the document is left untouched
/// while commitments still advance.
#[derive(Debug, Error)]
pub enum PatchError {
    /// A key or endpoint id is empty, too long, or not base64url charset.
    #[error("invalid id in patch: {0:?}")]
    PatchIdInvalid(String),
    /// An `add-public-keys` patch collides on id, with itself or the document.
    #[error("duplicate public key id: {0:?}")]
    PatchPublicKeyIdDuplicated(String),
    /// A public key entry's purposes are empty or contain duplicates.
    #[error("public key {0:?} has empty or duplicated purposes")]
    PatchPublicKeyPurposesIncorrect(String),
    /// A public key entry's JWK failed validation.
    #[error("public key {id:?} carries an invalid JWK")]
    PatchPublicKeyJwkInvalid {
        /// Id of the offending entry.
        id: String,
        /// The underlying JWK failure.
        #[source]
        source: CryptoError,
    },
    /// An `add-service-endpoints` patch collides on id.
    #[error("duplicate service endpoint id: {0:?}")]
    PatchServiceEndpointIdDuplicated(String),
    /// A service endpoint URI is empty or not plausibly a URI.
    #[error("invalid service endpoint URI: {0:?}")]
    PatchServiceEndpointUriInvalid(String),
}

impl ErrorCode for PatchError {
    fn code(&self) -> &'static str {
        match self {
            Self::PatchIdInvalid(_) => "PatchIdInvalid",
            Self::PatchPublicKeyIdDuplicated(_) => "PatchPublicKeyIdDuplicated",
            Self::PatchPublicKeyPurposesIncorrect(_) => "PatchPublicKeyPurposesIncorrect",
            Self::PatchPublicKeyJwkInvalid { .. } => "PatchPublicKeyJwkInvalid",
            Self::PatchServiceEndpointIdDuplicated(_) => "PatchServiceEndpointIdDuplicated",
            Self::PatchServiceEndpointUriInvalid(_) => "PatchServiceEndpointUriInvalid",
        }
    }
}

/// Errors of the operation store collaborator. These are I/O failures of
/// the backend, never verdicts about operation validity.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A generic error originating from the underlying backend.
    #[error("store backend error: {0}")]
    Backend(String),
    /// An error occurred while serializing data for storage.
    #[error("store encode error: {0}")]
    Encode(String),
    /// An error occurred while deserializing data from storage.
    #[error("store decode error: {0}")]
    Decode(String),
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Backend(_) => "StoreBackendError",
            Self::Encode(_) => "StoreEncodeError",
            Self::Decode(_) => "StoreDecodeError",
        }
    }
}

/// Errors of the content-addressable store collaborator.
#[derive(Debug, Error)]
pub enum CasError {
    /// The CAS could not be reached at all. Fatal to ingestion.
    #[error("content addressable store not reachable: {0}")]
    CasNotReachable(String),
    /// The CAS rejected a write.
    #[error("content addressable store write failed: {0}")]
    CasWriteFailure(String),
}

impl ErrorCode for CasError {
    fn code(&self) -> &'static str {
        match self {
            Self::CasNotReachable(_) => "CasNotReachable",
            Self::CasWriteFailure(_) => "CasWriteFailure",
        }
    }
}

/// Errors of the ledger adapter collaborator.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger could not be reached at all. Fatal to the ledger walk.
    #[error("ledger not reachable: {0}")]
    LedgerNotReachable(String),
    /// The adapter returned a record that breaks the monotonic stream.
    #[error("ledger stream is not monotonic at time {0}")]
    LedgerStreamNotMonotonic(u64),
}

impl ErrorCode for LedgerError {
    fn code(&self) -> &'static str {
        match self {
            Self::LedgerNotReachable(_) => "LedgerNotReachable",
            Self::LedgerStreamNotMonotonic(_) => "LedgerStreamNotMonotonic",
        }
    }
}

/// Errors raised while ingesting one anchored ledger transaction.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The anchor string is not `{operation_count}.{map_file_cid}`.
    #[error("anchor string has invalid format: {0:?}")]
    AnchorStringInvalidFormat(String),
    /// The declared operation count is zero.
    #[error("anchor string declares an invalid operation count: {0}")]
    AnchorStringOperationCountInvalid(u64),
    /// The declared operation count exceeds the per-batch limit.
    #[error("anchor string declares {got} operations, limit is {max}")]
    AnchorStringOperationCountExceedsLimit {
        /// Declared count.
        got: u64,
        /// Configured limit.
        max: u64,
    },
    /// The declared operation count disagrees with the batch contents.
    #[error("anchor string declares {declared} operations, batch holds {got}")]
    AnchorStringOperationCountMismatch {
        /// Count from the anchor string.
        declared: u64,
        /// Update entries actually present.
        got: usize,
    },
    /// A referenced file does not exist in the CAS.
    #[error("batch file {0} not found in content addressable store")]
    CasFileNotFound(String),
    /// A referenced file exceeds its size limit before decompression.
    #[error("batch file {0} exceeds the maximum fetch size")]
    CasFileExceedsMaximumSize(String),
    /// The CAS collaborator failed.
    #[error(transparent)]
    Cas(#[from] CasError),
    /// The map file container was invalid.
    #[error(transparent)]
    MapFile(#[from] MapFileError),
    /// The chunk file container was invalid.
    #[error(transparent)]
    ChunkFile(#[from] ChunkFileError),
    /// The store collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for IngestError {
    fn code(&self) -> &'static str {
        match self {
            Self::AnchorStringInvalidFormat(_) => "AnchorStringInvalidFormat",
            Self::AnchorStringOperationCountInvalid(_) => "AnchorStringOperationCountInvalid",
            Self::AnchorStringOperationCountExceedsLimit { .. } => {
                "AnchorStringOperationCountExceedsLimit"
            }
            Self::AnchorStringOperationCountMismatch { .. } => {
                "AnchorStringOperationCountMismatch"
            }
            Self::CasFileNotFound(_) => "CasFileNotFound",
            Self::CasFileExceedsMaximumSize(_) => "CasFileExceedsMaximumSize",
            Self::Cas(inner) => inner.code(),
            Self::MapFile(inner) => inner.code(),
            Self::ChunkFile(inner) => inner.code(),
            Self::Store(inner) => inner.code(),
        }
    }
}

/// Errors of the protocol version lookup.
#[derive(Debug, Error)]
pub enum VersionError {
    /// No registered protocol epoch covers the given transaction time.
    #[error("no protocol version covers transaction time {0}")]
    VersionNotFound(u64),
}

impl ErrorCode for VersionError {
    fn code(&self) -> &'static str {
        match self {
            Self::VersionNotFound(_) => "VersionManagerVersionNotFound",
        }
    }
}

/// Errors a resolution can surface. Individual invalid operations never
/// appear here; only collaborator failures do.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The operation store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The version manager had no processor for an anchored time.
    #[error(transparent)]
    Version(#[from] VersionError),
}

impl ErrorCode for ResolveError {
    fn code(&self) -> &'static str {
        match self {
            Self::Store(inner) => inner.code(),
            Self::Version(inner) => inner.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_strings() {
        assert_eq!(
            MapFileError::MapFileMultipleOperationsForTheSameDid.code(),
            "MapFileMultipleOperationsForTheSameDid"
        );
        assert_eq!(
            MapFileError::MapFileChunksPropertyDoesNotHaveExactlyOneElement.code(),
            "MapFileChunksPropertyDoesNotHaveExactlyOneElement"
        );
        assert_eq!(
            OperationError::Crypto(CryptoError::JwsSignatureInvalid).code(),
            "JwsSignatureInvalid"
        );
    }

    #[test]
    fn ingest_error_delegates_inner_codes() {
        let err = IngestError::from(MapFileError::MapFileDecompressionFailure);
        assert_eq!(err.code(), "MapFileDecompressionFailure");
    }
}
