// tests/common/mod.rs
use std::sync::Arc;

use async_trait::async_trait;
use biomatch::{
    core::identity::types::{AttemptRecord, IdentityHandle, IdentityRecord, StoredTemplate},
    storage::{IdentityStore, MemoryStore, StorageError},
    utils::config::Config,
    BiometricSystem,
};
use mockall::mock;

pub struct TestContext {
    pub system: BiometricSystem,
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let system = BiometricSystem::with_store(Config::default(), store.clone())
            .expect("Failed to build biometric system");

        Self { system, store }
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl IdentityStore for Store {
        async fn create_identity(&self, username: &str, email: &str) -> Result<IdentityRecord, StorageError>;
        async fn lookup_identity(&self, username: &str) -> Result<Option<IdentityRecord>, StorageError>;
        async fn store_template(
            &self,
            identity: IdentityHandle,
            hash: &str,
            serialized_vector: &str,
        ) -> Result<(), StorageError>;
        async fn fetch_templates(&self, identity: IdentityHandle) -> Result<Vec<StoredTemplate>, StorageError>;
        async fn append_attempt(
            &self,
            identity: IdentityHandle,
            success: bool,
            match_percentage: Option<f64>,
        ) -> Result<(), StorageError>;
        async fn fetch_attempts(&self, identity: IdentityHandle, limit: usize) -> Result<Vec<AttemptRecord>, StorageError>;
        async fn list_identities(&self) -> Result<Vec<(IdentityHandle, String)>, StorageError>;
    }
}

pub fn mocked_system(store: MockStore) -> BiometricSystem {
    BiometricSystem::with_store(Config::default(), Arc::new(store)).expect("Failed to build biometric system")
}
