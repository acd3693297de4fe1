// src/storage/mod.rs
mod errors;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocks;

use async_trait::async_trait;

use crate::core::identity::types::{AttemptRecord, IdentityHandle, IdentityRecord, StoredTemplate};

pub use errors::{Result, StorageError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb")]
pub use rocks::RocksStore;

/// Durable home for identities, templates and attempt logs.
///
/// Implementations enforce username and email uniqueness independently and
/// report a violation as [`StorageError::Duplicate`].
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn create_identity(&self, username: &str, email: &str) -> Result<IdentityRecord>;

    async fn lookup_identity(&self, username: &str) -> Result<Option<IdentityRecord>>;

    async fn store_template(
        &self,
        identity: IdentityHandle,
        hash: &str,
        serialized_vector: &str,
    ) -> Result<()>;

    /// Templates in enrollment order.
    async fn fetch_templates(&self, identity: IdentityHandle) -> Result<Vec<StoredTemplate>>;

    async fn append_attempt(
        &self,
        identity: IdentityHandle,
        success: bool,
        match_percentage: Option<f64>,
    ) -> Result<()>;

    /// Most recent first, at most `limit` records.
    async fn fetch_attempts(&self, identity: IdentityHandle, limit: usize) -> Result<Vec<AttemptRecord>>;

    async fn list_identities(&self) -> Result<Vec<(IdentityHandle, String)>>;
}
