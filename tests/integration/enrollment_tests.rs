// tests/integration/enrollment_tests.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use biomatch::{
    core::identity::types::{EnrollmentFailure, IdentityRecord},
    storage::{IdentityStore, StorageError},
    utils::error::BiometricError,
};
use tokio_test::{assert_err, assert_ok};

use crate::common::{mocked_system, MockStore, TestContext};

#[tokio::test]
async fn test_enrollment_stores_three_templates() {
    let ctx = TestContext::new();

    let result = ctx
        .system
        .enroll("alice", "alice@x.com", Some(3))
        .await
        .expect("Failed to enroll");

    assert!(result.success);
    assert_eq!(result.templates_stored, 3);

    let handle = result.identity.expect("identity handle");
    assert_eq!(ctx.store.fetch_templates(handle).await.unwrap().len(), 3);

    let status = ctx.system.enrollment_status("alice").await.unwrap();
    assert!(status.enrolled);
    assert_eq!(status.templates_stored, 3);
}

#[tokio::test]
async fn test_second_enrollment_of_same_username_rejected() {
    let ctx = TestContext::new();
    assert_ok!(ctx.system.enroll("alice", "alice@x.com", Some(3)).await);

    let again = ctx.system.enroll("alice", "alice2@x.com", Some(3)).await.unwrap();
    assert!(!again.success);
    assert_eq!(again.failure, Some(EnrollmentFailure::IdentityAlreadyExists));
    assert!(matches!(
        again.into_result(),
        Err(BiometricError::IdentityAlreadyExists(_))
    ));

    let identities = ctx.system.identities().await.unwrap();
    assert_eq!(identities.len(), 1);
    let templates = ctx.store.fetch_templates(identities[0].0).await.unwrap();
    assert_eq!(templates.len(), 3);
}

#[tokio::test]
async fn test_invalid_sample_count_is_an_error() {
    let ctx = TestContext::new();
    assert_err!(ctx.system.enroll("alice", "alice@x.com", Some(0)).await);
    assert!(ctx.system.identities().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_partial_enrollment_reports_stored_count() {
    let record = IdentityRecord::new("frank", "frank@x.com");
    let writes = Arc::new(AtomicUsize::new(0));

    let mut store = MockStore::new();
    store.expect_lookup_identity().returning(|_| Ok(None));
    let created = record.clone();
    store
        .expect_create_identity()
        .times(1)
        .returning(move |_, _| Ok(created.clone()));
    let counter = writes.clone();
    store.expect_store_template().times(3).returning(move |_, _, _| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Ok(())
        } else {
            Err(StorageError::DatabaseError("disk full".into()))
        }
    });

    let system = mocked_system(store);
    let result = system.enroll("frank", "frank@x.com", Some(5)).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.failure, Some(EnrollmentFailure::PartialEnrollment));
    assert_eq!(result.templates_stored, 2);
    assert_eq!(result.templates_requested, 5);
    assert_eq!(result.identity, Some(record.handle));
    assert!(result.message.contains("disk full"));
}

#[tokio::test]
async fn test_storage_failure_during_registration_propagates() {
    let mut store = MockStore::new();
    store.expect_lookup_identity().returning(|_| Ok(None));
    store
        .expect_create_identity()
        .returning(|_, _| Err(StorageError::DatabaseError("connection lost".into())));
    store.expect_store_template().never();

    let system = mocked_system(store);
    let result = system.enroll("gina", "gina@x.com", Some(2)).await;

    assert!(matches!(result, Err(BiometricError::Storage(StorageError::DatabaseError(_)))));
}

#[tokio::test]
async fn test_duplicate_email_from_store_is_registration_failure() {
    let mut store = MockStore::new();
    store.expect_lookup_identity().returning(|_| Ok(None));
    store.expect_create_identity().returning(|_, email| {
        Err(StorageError::Duplicate {
            field: "email",
            value: email.to_string(),
        })
    });
    store.expect_store_template().never();

    let system = mocked_system(store);
    let result = system.enroll("hal", "taken@x.com", Some(2)).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.failure, Some(EnrollmentFailure::RegistrationFailed));
    assert_eq!(result.templates_stored, 0);
}
