// tests/integration/authentication_tests.rs
use biomatch::{
    core::identity::{
        types::{AuthFailure, IdentityRecord, LiveSample, StoredTemplate},
        TemplateGenerator,
    },
    storage::IdentityStore,
    utils::error::BiometricError,
};
use chrono::Utc;

use crate::common::{mocked_system, MockStore, TestContext};

#[tokio::test]
async fn test_enrolled_sample_id_grants_access() {
    let ctx = TestContext::new();
    let enrolled = ctx
        .system
        .enroll("alice", "alice@x.com", Some(3))
        .await
        .expect("Failed to enroll");

    let live = LiveSample::Identifier(enrolled.sample_ids[0].clone());
    let result = ctx
        .system
        .authenticate("alice", Some(live))
        .await
        .expect("Failed to authenticate");

    assert!(result.success);
    assert_eq!(result.message, "Access Granted");
    assert_eq!(result.match_percentage, 100.0);
    assert_eq!(result.username, "alice");
}

#[tokio::test]
async fn test_never_enrolled_user_not_found() {
    let ctx = TestContext::new();

    let result = ctx.system.authenticate("bob", None).await.unwrap();
    assert!(!result.success);
    assert_eq!(result.message, "User not found");
    assert_eq!(result.match_percentage, 0.0);
    assert_eq!(result.failure, Some(AuthFailure::UserNotFound));
    assert!(matches!(result.into_result(), Err(BiometricError::UserNotFound(_))));
}

#[tokio::test]
async fn test_unknown_user_never_touches_templates_or_log() {
    let mut store = MockStore::new();
    store
        .expect_lookup_identity()
        .withf(|username| username == "bob")
        .times(1)
        .returning(|_| Ok(None));
    store.expect_fetch_templates().never();
    store.expect_append_attempt().never();

    let system = mocked_system(store);
    let result = system.authenticate("bob", None).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.match_percentage, 0.0);
}

#[tokio::test]
async fn test_every_match_decision_is_logged() {
    let record = IdentityRecord::new("ivy", "ivy@x.com");
    let template = TemplateGenerator::default().generate("ivy-finger").unwrap();
    let stored = StoredTemplate {
        identity: record.handle,
        hash: template.hash.clone(),
        serialized_vector: template.serialized.clone(),
        enrolled_at: Utc::now(),
    };

    let mut store = MockStore::new();
    let found = record.clone();
    store.expect_lookup_identity().returning(move |_| Ok(Some(found.clone())));
    store.expect_fetch_templates().returning(move |_| Ok(vec![stored.clone()]));
    let handle = record.handle;
    store
        .expect_append_attempt()
        .withf(move |identity, success, percentage| {
            *identity == handle && *success && matches!(percentage, Some(p) if (*p - 100.0).abs() < 1e-9)
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    store
        .expect_append_attempt()
        .withf(move |identity, success, percentage| *identity == handle && !*success && percentage.is_some())
        .times(1)
        .returning(|_, _, _| Ok(()));

    let system = mocked_system(store);

    let granted = system
        .authenticate("ivy", Some(LiveSample::Identifier("ivy-finger".into())))
        .await
        .unwrap();
    assert!(granted.success);

    let denied = system
        .authenticate("ivy", Some(LiveSample::Identifier("someone-else".into())))
        .await
        .unwrap();
    assert!(!denied.success);
}

#[tokio::test]
async fn test_history_returns_min_of_attempts_and_limit() {
    let ctx = TestContext::new();
    let enrolled = ctx.system.enroll("alice", "alice@x.com", Some(3)).await.unwrap();

    for _ in 0..4 {
        ctx.system.authenticate("alice", None).await.unwrap();
    }
    let live = LiveSample::Identifier(enrolled.sample_ids[1].clone());
    ctx.system.authenticate("alice", Some(live)).await.unwrap();

    let limited = ctx.system.history("alice", Some(3)).await.unwrap();
    assert_eq!(limited.len(), 3);
    assert!(limited[0].success);
    assert!(limited.iter().skip(1).all(|attempt| !attempt.success));
    assert!(limited.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    assert_eq!(ctx.system.history("alice", Some(50)).await.unwrap().len(), 5);
    assert!(ctx.system.history("nobody", Some(5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_percentages_stay_in_range() {
    let ctx = TestContext::new();
    ctx.system.enroll("alice", "alice@x.com", Some(2)).await.unwrap();

    for n in 0..10 {
        let live = LiveSample::Identifier(format!("probe-{}", n));
        let result = ctx.system.authenticate("alice", Some(live)).await.unwrap();
        assert!((0.0..=100.0).contains(&result.match_percentage));
        assert!(!result.success);
    }

    for attempt in ctx.system.history("alice", Some(10)).await.unwrap() {
        let percentage = attempt.match_percentage.expect("templates existed");
        assert!((0.0..=100.0).contains(&percentage));
    }
}

#[tokio::test]
async fn test_tampered_store_surfaces_error() {
    let ctx = TestContext::new();
    let enrolled = ctx.system.enroll("alice", "alice@x.com", Some(1)).await.unwrap();
    let handle = enrolled.identity.unwrap();

    ctx.store
        .store_template(handle, "0000", "[0.0]")
        .await
        .unwrap();

    let result = ctx.system.authenticate("alice", None).await;
    assert!(matches!(result, Err(BiometricError::IntegrityMismatch { index: 1 })));

    let history = ctx.system.history("alice", None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].match_percentage, None);
}
