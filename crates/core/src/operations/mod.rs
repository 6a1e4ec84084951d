// Path: crates/core/src/operations/mod.rs

//! Parsers for the four anchored operation kinds.
//!
//! Each parser accepts the operation's raw bytes and yields a typed record
//! with every derived field precomputed. Parsing enforces the structural
//! rules only (exact property sets, hash bindings, self-consistent JWS),
//! so an operation failing here is dropped at ingestion and never enters
//! the store. Whether an operation matches the *state* it lands on
//! (commitment chains, deactivation) is the processor's concern.

mod create;
mod deactivate;
mod recover;
mod update;

pub use create::CreateOperation;
pub use deactivate::DeactivateOperation;
pub use recover::RecoverOperation;
pub use update::UpdateOperation;

use serde_json::{Map, Value};
use trellis_types::config::ProtocolConfig;
use trellis_types::error::OperationError;
use trellis_types::operation::{AnchoredOperation, OperationKind};

/// A fully parsed operation of any kind.
#[derive(Clone, Debug)]
pub enum ParsedOperation {
    /// A parsed create operation.
    Create(CreateOperation),
    /// A parsed update operation.
    Update(UpdateOperation),
    /// A parsed recover operation.
    Recover(RecoverOperation),
    /// A parsed deactivate operation.
    Deactivate(DeactivateOperation),
}

/// Parses the bytes of an anchored operation according to its declared kind.
pub fn parse_anchored(
    operation: &AnchoredOperation,
    config: &ProtocolConfig,
) -> Result<ParsedOperation, OperationError> {
    match operation.kind {
        OperationKind::Create => {
            CreateOperation::parse(&operation.operation_bytes, config).map(ParsedOperation::Create)
        }
        OperationKind::Update => {
            UpdateOperation::parse(&operation.operation_bytes, config).map(ParsedOperation::Update)
        }
        OperationKind::Recover => RecoverOperation::parse(&operation.operation_bytes, config)
            .map(ParsedOperation::Recover),
        OperationKind::Deactivate => {
            DeactivateOperation::parse(&operation.operation_bytes, config)
                .map(ParsedOperation::Deactivate)
        }
    }
}

// --- Shared structural helpers -------------------------------------------

/// Enforces the per-operation size limit before anything is decoded.
fn check_size(bytes: &[u8], config: &ProtocolConfig) -> Result<(), OperationError> {
    if bytes.len() > config.max_operation_bytes {
        return Err(OperationError::OperationExceedsMaximumSize {
            got: bytes.len(),
            max: config.max_operation_bytes,
        });
    }
    Ok(())
}

/// Parses the bytes as a JSON object.
fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, OperationError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| OperationError::OperationNotJson(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(OperationError::OperationNotJson("not a JSON object".into())),
    }
}

/// Checks that the object's property set is exactly `expected`.
fn expect_exact_properties(
    map: &Map<String, Value>,
    expected: &[&str],
    violation: OperationError,
) -> Result<(), OperationError> {
    if map.len() != expected.len() || !expected.iter().all(|k| map.contains_key(*k)) {
        return Err(violation);
    }
    Ok(())
}

/// Checks the `type` tag against the expected kind.
fn expect_type_tag(map: &Map<String, Value>, expected: OperationKind) -> Result<(), OperationError> {
    let tag = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or(OperationError::OperationTypeMissingOrUnknown)?;
    let kind: OperationKind = serde_json::from_value(Value::String(tag.to_owned()))
        .map_err(|_| OperationError::OperationTypeMissingOrUnknown)?;
    if kind != expected {
        return Err(OperationError::OperationTypeMismatch);
    }
    Ok(())
}

/// Extracts a string property.
fn string_property<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    violation: fn() -> OperationError,
) -> Result<&'a str, OperationError> {
    map.get(key).and_then(Value::as_str).ok_or_else(violation)
}

/// Verifies a delta value against its declared hash and attempts the typed
/// parse.
///
/// The hash binds the delta *value* exactly as anchored; a delta that
/// hash-checks but does not deserialize into the typed shape is carried as
/// `None`, which the processor treats as "commitments may advance, the
/// document does not".
fn bind_delta(
    delta_value: &Value,
    declared_hash: &str,
    mismatch: OperationError,
) -> Result<Option<trellis_types::operation::Delta>, OperationError> {
    let canonical = trellis_crypto::canonicalize(delta_value)?;
    if !trellis_crypto::is_valid_hash(&canonical, declared_hash) {
        return Err(mismatch);
    }
    Ok(serde_json::from_value(delta_value.clone()).ok())
}
