// Path: crates/core/src/operations/recover.rs

//! The recover operation parser.

use super::{bind_delta, check_size, expect_exact_properties, expect_type_tag, parse_object, string_property};
use serde_json::Value;
use trellis_crypto::CompactJws;
use trellis_types::config::ProtocolConfig;
use trellis_types::did::DidSuffix;
use trellis_types::error::{CryptoError, OperationError};
use trellis_types::operation::{Delta, OperationKind, RecoverSignedPayload};

/// A structurally valid recover operation.
///
/// Wire shape: `{type: "recover", did_suffix, signed_data, delta}`. The
/// signed payload is `{recovery_key, recovery_commitment, delta_hash}`;
/// the JWS must verify under the revealed `recovery_key`, and the delta
/// must hash to the signed `delta_hash`.
#[derive(Clone, Debug)]
pub struct RecoverOperation {
    /// The DID the operation claims to act on.
    pub did_suffix: DidSuffix,
    /// The parsed compact JWS.
    pub signed_data: CompactJws,
    /// The decoded and verified payload of `signed_data`.
    pub payload: RecoverSignedPayload,
    /// The typed delta, when the hash-bound value also deserializes.
    pub delta: Option<Delta>,
}

impl RecoverOperation {
    /// Parses and structurally validates recover operation bytes.
    pub fn parse(bytes: &[u8], config: &ProtocolConfig) -> Result<Self, OperationError> {
        check_size(bytes, config)?;
        let map = parse_object(bytes)?;
        expect_exact_properties(
            &map,
            &["type", "did_suffix", "signed_data", "delta"],
            OperationError::RecoverOperationMissingOrUnknownProperty,
        )?;
        expect_type_tag(&map, OperationKind::Recover)?;

        let did_suffix = DidSuffix::from(string_property(&map, "did_suffix", || {
            OperationError::RecoverOperationMissingOrUnknownProperty
        })?);
        let compact = string_property(&map, "signed_data", || {
            OperationError::RecoverOperationMissingOrUnknownProperty
        })?;
        let signed_data = CompactJws::parse(compact)?;
        let payload: RecoverSignedPayload = signed_data.decode_payload().map_err(|e| match e {
            CryptoError::JwsPayloadNotJson(_) => {
                OperationError::RecoverOperationSignedPayloadMissingOrUnknownProperty
            }
            other => OperationError::Crypto(other),
        })?;
        signed_data.verify(&payload.recovery_key)?;

        let delta_value = map.get("delta").cloned().unwrap_or(Value::Null);
        let delta = bind_delta(
            &delta_value,
            &payload.delta_hash,
            OperationError::RecoverOperationDeltaHashMismatch,
        )?;

        Ok(Self {
            did_suffix,
            signed_data,
            payload,
            delta,
        })
    }
}
