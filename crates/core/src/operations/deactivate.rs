// Path: crates/core/src/operations/deactivate.rs

//! The deactivate operation parser.

use super::{check_size, expect_exact_properties, expect_type_tag, parse_object, string_property};
use trellis_crypto::CompactJws;
use trellis_types::config::ProtocolConfig;
use trellis_types::did::DidSuffix;
use trellis_types::error::{CryptoError, OperationError};
use trellis_types::operation::{DeactivateSignedPayload, OperationKind};

/// A structurally valid deactivate operation.
///
/// Wire shape: `{type: "deactivate", did_suffix, signed_data}`. The signed
/// payload is `{did_suffix, recovery_key}` and must name the same DID the
/// operation is anchored against; there is no delta, since deactivation
/// leaves nothing to patch.
#[derive(Clone, Debug)]
pub struct DeactivateOperation {
    /// The DID the operation claims to act on.
    pub did_suffix: DidSuffix,
    /// The parsed compact JWS.
    pub signed_data: CompactJws,
    /// The decoded and verified payload of `signed_data`.
    pub payload: DeactivateSignedPayload,
}

impl DeactivateOperation {
    /// Parses and structurally validates deactivate operation bytes.
    pub fn parse(bytes: &[u8], config: &ProtocolConfig) -> Result<Self, OperationError> {
        check_size(bytes, config)?;
        let map = parse_object(bytes)?;
        expect_exact_properties(
            &map,
            &["type", "did_suffix", "signed_data"],
            OperationError::DeactivateOperationMissingOrUnknownProperty,
        )?;
        expect_type_tag(&map, OperationKind::Deactivate)?;

        let did_suffix = DidSuffix::from(string_property(&map, "did_suffix", || {
            OperationError::DeactivateOperationMissingOrUnknownProperty
        })?);
        let compact = string_property(&map, "signed_data", || {
            OperationError::DeactivateOperationMissingOrUnknownProperty
        })?;
        let signed_data = CompactJws::parse(compact)?;
        let payload: DeactivateSignedPayload =
            signed_data.decode_payload().map_err(|e| match e {
                CryptoError::JwsPayloadNotJson(_) => {
                    OperationError::DeactivateOperationSignedPayloadMissingOrUnknownProperty
                }
                other => OperationError::Crypto(other),
            })?;
        signed_data.verify(&payload.recovery_key)?;

        if payload.did_suffix != did_suffix {
            return Err(OperationError::DeactivateOperationDidSuffixMismatch);
        }

        Ok(Self {
            did_suffix,
            signed_data,
            payload,
        })
    }
}
