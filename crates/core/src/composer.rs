// Path: crates/core/src/composer.rs

//! The document composer: validation and application of patches.
//!
//! Patches are applied in order onto a starting document. Validation and
//! application are one pass, because "duplicate id" is only decidable
//! against the document as it evolves through the patch list. Any invalid
//! patch aborts the whole delta; the caller (the processor) then treats
//! the operation as a document no-op while still advancing commitments.

use trellis_types::document::{DocumentState, Patch, PublicKeyEntry, ServiceEndpointEntry};
use trellis_types::error::PatchError;

const MAX_ID_LENGTH: usize = 50;
const MAX_ENDPOINT_LENGTH: usize = 300;

/// Applies validated patch sequences to document state.
pub struct DocumentComposer;

impl DocumentComposer {
    /// Applies `patches` in order to `base`, returning the new document.
    ///
    /// The base document is untouched on error.
    pub fn apply_patches(
        base: &DocumentState,
        patches: &[Patch],
    ) -> Result<DocumentState, PatchError> {
        let mut document = base.clone();
        for patch in patches {
            document = Self::apply_patch(document, patch)?;
        }
        Ok(document)
    }

    fn apply_patch(mut document: DocumentState, patch: &Patch) -> Result<DocumentState, PatchError> {
        match patch {
            Patch::Replace { document: replacement } => {
                Self::validate_document(replacement)?;
                Ok(replacement.clone())
            }
            Patch::AddPublicKeys { public_keys } => {
                for entry in public_keys {
                    Self::validate_public_key_entry(entry)?;
                    if document.public_key(&entry.id).is_some() {
                        return Err(PatchError::PatchPublicKeyIdDuplicated(entry.id.clone()));
                    }
                    document.public_keys.push(entry.clone());
                }
                Ok(document)
            }
            Patch::RemovePublicKeys { ids } => {
                for id in ids {
                    Self::validate_id(id)?;
                }
                document.public_keys.retain(|k| !ids.contains(&k.id));
                Ok(document)
            }
            Patch::AddServiceEndpoints { service_endpoints } => {
                for entry in service_endpoints {
                    Self::validate_service_endpoint_entry(entry)?;
                    if document.service_endpoint(&entry.id).is_some() {
                        return Err(PatchError::PatchServiceEndpointIdDuplicated(
                            entry.id.clone(),
                        ));
                    }
                    document.service_endpoints.push(entry.clone());
                }
                Ok(document)
            }
            Patch::RemoveServiceEndpoints { ids } => {
                for id in ids {
                    Self::validate_id(id)?;
                }
                document.service_endpoints.retain(|s| !ids.contains(&s.id));
                Ok(document)
            }
        }
    }

    /// Validates a full document, as carried by a `replace` patch.
    pub fn validate_document(document: &DocumentState) -> Result<(), PatchError> {
        let mut rebuilt = DocumentState::default();
        for entry in &document.public_keys {
            Self::validate_public_key_entry(entry)?;
            if rebuilt.public_key(&entry.id).is_some() {
                return Err(PatchError::PatchPublicKeyIdDuplicated(entry.id.clone()));
            }
            rebuilt.public_keys.push(entry.clone());
        }
        for entry in &document.service_endpoints {
            Self::validate_service_endpoint_entry(entry)?;
            if rebuilt.service_endpoint(&entry.id).is_some() {
                return Err(PatchError::PatchServiceEndpointIdDuplicated(entry.id.clone()));
            }
            rebuilt.service_endpoints.push(entry.clone());
        }
        Ok(())
    }

    fn validate_public_key_entry(entry: &PublicKeyEntry) -> Result<(), PatchError> {
        Self::validate_id(&entry.id)?;
        trellis_crypto::validate_public_jwk(&entry.jwk).map_err(|source| {
            PatchError::PatchPublicKeyJwkInvalid {
                id: entry.id.clone(),
                source,
            }
        })?;
        let mut seen = std::collections::HashSet::new();
        if entry.purposes.is_empty() || !entry.purposes.iter().all(|p| seen.insert(*p)) {
            return Err(PatchError::PatchPublicKeyPurposesIncorrect(entry.id.clone()));
        }
        Ok(())
    }

    fn validate_service_endpoint_entry(entry: &ServiceEndpointEntry) -> Result<(), PatchError> {
        Self::validate_id(&entry.id)?;
        let uri = &entry.endpoint;
        if uri.is_empty() || uri.len() > MAX_ENDPOINT_LENGTH || uri.chars().any(char::is_whitespace)
        {
            return Err(PatchError::PatchServiceEndpointUriInvalid(uri.clone()));
        }
        Ok(())
    }

    // Ids must be short base64url strings so they survive every transport
    // the document does.
    fn validate_id(id: &str) -> Result<(), PatchError> {
        let charset_ok = id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if id.is_empty() || id.len() > MAX_ID_LENGTH || !charset_ok {
            return Err(PatchError::PatchIdInvalid(id.to_owned()));
        }
        Ok(())
    }
}
