// Path: crates/api/src/cas.rs

//! The content-addressable store contract.
//!
//! Batch files live in a CAS addressed by the base64url multihash of their
//! content. The kernel only consumes this interface; fetching, pinning and
//! replication are the collaborator's business.

use async_trait::async_trait;
use std::sync::Arc;
use trellis_types::anchor::Cid;
use trellis_types::error::CasError;

/// Outcome of a CAS read.
///
/// Absence and over-size are ordinary outcomes the ingester maps to typed
/// rejections; only transport-level failure surfaces as [`CasError`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FetchResult {
    /// The content was found and is within the size limit.
    Success(Vec<u8>),
    /// No content with this identifier exists.
    NotFound,
    /// The content exists but exceeds the caller's size limit.
    MaxSizeExceeded,
}

/// A store retrieving immutable content by its multihash identifier.
#[async_trait]
pub trait ContentAddressableStore: Send + Sync {
    /// Persists content and returns its identifier.
    async fn write(&self, content: &[u8]) -> Result<Cid, CasError>;

    /// Fetches content by identifier, bounded by `max_size_bytes`.
    async fn read(&self, cid: &Cid, max_size_bytes: usize) -> Result<FetchResult, CasError>;
}

// Blanket implementation so the CAS can be shared behind an `Arc`.
#[async_trait]
impl<T: ContentAddressableStore + ?Sized> ContentAddressableStore for Arc<T> {
    async fn write(&self, content: &[u8]) -> Result<Cid, CasError> {
        (**self).write(content).await
    }

    async fn read(&self, cid: &Cid, max_size_bytes: usize) -> Result<FetchResult, CasError> {
        (**self).read(cid, max_size_bytes).await
    }
}
