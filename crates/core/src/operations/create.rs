// Path: crates/core/src/operations/create.rs

//! The create operation parser.

use super::{bind_delta, check_size, expect_exact_properties, expect_type_tag, parse_object};
use serde_json::Value;
use trellis_types::config::ProtocolConfig;
use trellis_types::did::DidSuffix;
use trellis_types::error::OperationError;
use trellis_types::operation::{Delta, OperationKind, SuffixData};

/// A structurally valid create operation.
///
/// Wire shape: `{type: "create", suffix_data, delta}` with
/// `suffix_data = {delta_hash, recovery_commitment}` and
/// `delta_hash == multihash(canonicalize(delta))`. The DID's unique suffix
/// is derived from the suffix data and precomputed here.
#[derive(Clone, Debug)]
pub struct CreateOperation {
    /// The derived DID suffix: `canonicalize_then_hash_then_encode(suffix_data)`.
    pub did_unique_suffix: DidSuffix,
    /// The suffix data the DID identifier commits to.
    pub suffix_data: SuffixData,
    /// The typed delta, when the hash-bound value also deserializes.
    pub delta: Option<Delta>,
}

impl CreateOperation {
    /// Parses and structurally validates create operation bytes.
    pub fn parse(bytes: &[u8], config: &ProtocolConfig) -> Result<Self, OperationError> {
        check_size(bytes, config)?;
        let map = parse_object(bytes)?;
        expect_exact_properties(
            &map,
            &["type", "suffix_data", "delta"],
            OperationError::CreateOperationMissingOrUnknownProperty,
        )?;
        expect_type_tag(&map, OperationKind::Create)?;

        let suffix_data: SuffixData = map
            .get("suffix_data")
            .cloned()
            .map(serde_json::from_value)
            .and_then(Result::ok)
            .ok_or(OperationError::CreateOperationSuffixDataMissingOrUnknownProperty)?;

        let delta_value = map.get("delta").cloned().unwrap_or(Value::Null);
        let delta = bind_delta(
            &delta_value,
            &suffix_data.delta_hash,
            OperationError::CreateOperationDeltaHashMismatch,
        )?;

        let did_unique_suffix = DidSuffix(trellis_crypto::canonicalize_then_hash_then_encode(
            &suffix_data,
            config.hash_algorithm_code,
        )?);

        Ok(Self {
            did_unique_suffix,
            suffix_data,
            delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trellis_crypto::{canonicalize, canonicalize_then_hash_then_encode, hash_then_encode};
    use trellis_types::config::MULTIHASH_SHA2_256;
    use trellis_types::error::ErrorCode;

    fn valid_create_bytes() -> Vec<u8> {
        let delta = json!({
            "patches": [],
            "update_commitment": "EiUpdateCommitment",
        });
        let delta_hash =
            hash_then_encode(&canonicalize(&delta).unwrap(), MULTIHASH_SHA2_256).unwrap();
        serde_json::to_vec(&json!({
            "type": "create",
            "suffix_data": {
                "delta_hash": delta_hash,
                "recovery_commitment": "EiRecoveryCommitment",
            },
            "delta": delta,
        }))
        .unwrap()
    }

    #[test]
    fn valid_create_parses_with_derived_suffix() {
        let bytes = valid_create_bytes();
        let parsed = CreateOperation::parse(&bytes, &ProtocolConfig::default()).unwrap();
        let expected =
            canonicalize_then_hash_then_encode(&parsed.suffix_data, MULTIHASH_SHA2_256).unwrap();
        assert_eq!(parsed.did_unique_suffix.as_str(), expected);
        assert!(parsed.delta.is_some());
    }

    #[test]
    fn extra_top_level_property_is_rejected() {
        let mut value: serde_json::Value =
            serde_json::from_slice(&valid_create_bytes()).unwrap();
        value["extra"] = json!(1);
        let err = CreateOperation::parse(
            &serde_json::to_vec(&value).unwrap(),
            &ProtocolConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "CreateOperationMissingOrUnknownProperty");
    }

    #[test]
    fn wrong_type_tag_is_rejected() {
        let mut value: serde_json::Value =
            serde_json::from_slice(&valid_create_bytes()).unwrap();
        value["type"] = json!("update");
        let err = CreateOperation::parse(
            &serde_json::to_vec(&value).unwrap(),
            &ProtocolConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "OperationTypeMismatch");
    }

    #[test]
    fn tampered_delta_fails_hash_binding() {
        let mut value: serde_json::Value =
            serde_json::from_slice(&valid_create_bytes()).unwrap();
        value["delta"]["update_commitment"] = json!("EiSomethingElse");
        let err = CreateOperation::parse(
            &serde_json::to_vec(&value).unwrap(),
            &ProtocolConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "CreateOperationDeltaHashMismatch");
    }

    #[test]
    fn hash_bound_but_untyped_delta_is_carried_as_none() {
        let delta = json!({"neither": "patches", "nor": "commitment"});
        let delta_hash =
            hash_then_encode(&canonicalize(&delta).unwrap(), MULTIHASH_SHA2_256).unwrap();
        let bytes = serde_json::to_vec(&json!({
            "type": "create",
            "suffix_data": {
                "delta_hash": delta_hash,
                "recovery_commitment": "EiRecoveryCommitment",
            },
            "delta": delta,
        }))
        .unwrap();
        let parsed = CreateOperation::parse(&bytes, &ProtocolConfig::default()).unwrap();
        assert!(parsed.delta.is_none());
    }

    #[test]
    fn oversized_operation_is_rejected() {
        let config = ProtocolConfig {
            max_operation_bytes: 8,
            ..ProtocolConfig::default()
        };
        let err = CreateOperation::parse(&valid_create_bytes(), &config).unwrap_err();
        assert_eq!(err.code(), "OperationExceedsMaximumSize");
    }
}
