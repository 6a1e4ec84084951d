// Path: crates/test_utils/src/cas_mock.rs

//! An in-memory content-addressable store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use trellis_api::cas::{ContentAddressableStore, FetchResult};
use trellis_types::anchor::Cid;
use trellis_types::config::MULTIHASH_SHA2_256;
use trellis_types::error::CasError;

/// A CAS keyed by the encoded multihash of the content, like the real one.
#[derive(Default)]
pub struct MockCas {
    content: RwLock<HashMap<Cid, Vec<u8>>>,
}

impl MockCas {
    /// Creates an empty mock CAS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the identifier the mock assigns to `content`.
    pub fn cid_of(content: &[u8]) -> Cid {
        Cid::from(trellis_crypto::hash_then_encode(content, MULTIHASH_SHA2_256).unwrap())
    }
}

#[async_trait]
impl ContentAddressableStore for MockCas {
    async fn write(&self, content: &[u8]) -> Result<Cid, CasError> {
        let cid = Self::cid_of(content);
        self.content
            .write()
            .await
            .insert(cid.clone(), content.to_vec());
        Ok(cid)
    }

    async fn read(&self, cid: &Cid, max_size_bytes: usize) -> Result<FetchResult, CasError> {
        match self.content.read().await.get(cid) {
            Some(bytes) if bytes.len() > max_size_bytes => Ok(FetchResult::MaxSizeExceeded),
            Some(bytes) => Ok(FetchResult::Success(bytes.clone())),
            None => Ok(FetchResult::NotFound),
        }
    }
}
