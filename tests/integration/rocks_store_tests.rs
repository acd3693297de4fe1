// tests/integration/rocks_store_tests.rs
use std::sync::Arc;

use biomatch::{
    core::identity::types::LiveSample,
    storage::RocksStore,
    utils::config::{Config, StorageBackend},
    BiometricSystem,
};
use tempfile::tempdir;

#[tokio::test]
async fn test_enrollment_persists_across_restarts() {
    let temp_dir = tempdir().unwrap();
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Rocksdb;
    config.storage.path = Some(temp_dir.path().to_str().unwrap().to_string());

    let sample_id = {
        let system = BiometricSystem::new(config.clone()).unwrap();
        let enrolled = system.enroll("alice", "alice@x.com", Some(3)).await.unwrap();
        assert!(enrolled.success);
        enrolled.sample_ids[2].clone()
    };

    let system = BiometricSystem::new(config).unwrap();
    let status = system.enrollment_status("alice").await.unwrap();
    assert_eq!(status.templates_stored, 3);

    let result = system
        .authenticate("alice", Some(LiveSample::Identifier(sample_id)))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.match_percentage, 100.0);
    assert_eq!(system.history("alice", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_authentications_for_different_identities() {
    let temp_dir = tempdir().unwrap();
    let store = Arc::new(RocksStore::open(temp_dir.path()).unwrap());
    let system = Arc::new(BiometricSystem::with_store(Config::default(), store).unwrap());

    let mut sample_ids = Vec::new();
    for i in 0..5 {
        let enrolled = system
            .enroll(&format!("user{}", i), &format!("user{}@x.com", i), Some(2))
            .await
            .unwrap();
        sample_ids.push(enrolled.sample_ids[0].clone());
    }

    let mut handles = Vec::new();
    for (i, sample_id) in sample_ids.into_iter().enumerate() {
        let system = system.clone();
        handles.push(tokio::spawn(async move {
            system
                .authenticate(&format!("user{}", i), Some(LiveSample::Identifier(sample_id)))
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().success);
    }
}
