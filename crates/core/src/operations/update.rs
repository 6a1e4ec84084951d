// Path: crates/core/src/operations/update.rs

//! The update operation parser.

use super::{bind_delta, check_size, expect_exact_properties, expect_type_tag, parse_object, string_property};
use serde_json::Value;
use trellis_crypto::CompactJws;
use trellis_types::config::ProtocolConfig;
use trellis_types::did::DidSuffix;
use trellis_types::error::{CryptoError, OperationError};
use trellis_types::operation::{Delta, OperationKind, UpdateSignedPayload};

/// A structurally valid update operation.
///
/// Wire shape: `{type: "update", did_suffix, signed_data, delta}`. The
/// signed payload is `{update_key, delta_hash}`; the JWS must verify under
/// the revealed `update_key` itself, and the delta must hash to the signed
/// `delta_hash`. Whether the revealed key matches the DID's current update
/// commitment is decided at apply time.
#[derive(Clone, Debug)]
pub struct UpdateOperation {
    /// The DID the operation claims to act on.
    pub did_suffix: DidSuffix,
    /// The parsed compact JWS.
    pub signed_data: CompactJws,
    /// The decoded and verified payload of `signed_data`.
    pub payload: UpdateSignedPayload,
    /// The typed delta, when the hash-bound value also deserializes.
    pub delta: Option<Delta>,
}

impl UpdateOperation {
    /// Parses and structurally validates update operation bytes.
    pub fn parse(bytes: &[u8], config: &ProtocolConfig) -> Result<Self, OperationError> {
        check_size(bytes, config)?;
        let map = parse_object(bytes)?;
        expect_exact_properties(
            &map,
            &["type", "did_suffix", "signed_data", "delta"],
            OperationError::UpdateOperationMissingOrUnknownProperty,
        )?;
        expect_type_tag(&map, OperationKind::Update)?;

        let did_suffix = DidSuffix::from(string_property(&map, "did_suffix", || {
            OperationError::UpdateOperationMissingOrUnknownProperty
        })?);
        let compact = string_property(&map, "signed_data", || {
            OperationError::UpdateOperationMissingOrUnknownProperty
        })?;
        let signed_data = CompactJws::parse(compact)?;
        let payload: UpdateSignedPayload = signed_data.decode_payload().map_err(|e| match e {
            CryptoError::JwsPayloadNotJson(_) => {
                OperationError::UpdateOperationSignedPayloadMissingOrUnknownProperty
            }
            other => OperationError::Crypto(other),
        })?;
        signed_data.verify(&payload.update_key)?;

        let delta_value = map.get("delta").cloned().unwrap_or(Value::Null);
        let delta = bind_delta(
            &delta_value,
            &payload.delta_hash,
            OperationError::UpdateOperationDeltaHashMismatch,
        )?;

        Ok(Self {
            did_suffix,
            signed_data,
            payload,
            delta,
        })
    }
}
