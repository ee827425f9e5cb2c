//! 用户资料与技能声明测试

use domain::UserId;

use super::test_support::TestContext;
use crate::{
    error::ErrorKind,
    services::{RecordVerificationRequest, SyncUserRequest, UpdateProfileRequest},
};

#[tokio::test]
async fn test_sync_user_is_idempotent_and_defaults_name_to_email() {
    let ctx = TestContext::new();
    let request = SyncUserRequest {
        user_id: UserId::new("uid-1"),
        email: "grace@example.com".into(),
        name: None,
    };

    let first = ctx.profiles.sync_user(request.clone()).await.unwrap();
    assert_eq!(first.name.as_str(), "grace");

    let second = ctx.profiles.sync_user(request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_sync_user_with_taken_email_conflicts() {
    let ctx = TestContext::new();
    ctx.user("a", "Alice").await;

    let err = ctx
        .profiles
        .sync_user(SyncUserRequest {
            user_id: UserId::new("other"),
            email: "a@example.com".into(),
            name: Some("Impostor".into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_update_profile_changes_only_given_fields() {
    let ctx = TestContext::new();
    ctx.user("a", "Alice").await;
    let id = UserId::new("a");

    ctx.profiles
        .update_profile(
            &id,
            UpdateProfileRequest {
                bio: Some("Guitar tutor".into()),
                city: Some("Lyon".into()),
                ..UpdateProfileRequest::default()
            },
        )
        .await
        .unwrap();
    let updated = ctx
        .profiles
        .update_profile(
            &id,
            UpdateProfileRequest {
                name: Some("Alice M.".into()),
                ..UpdateProfileRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name.as_str(), "Alice M.");
    assert_eq!(updated.bio.as_deref(), Some("Guitar tutor"));
    assert_eq!(updated.city.as_deref(), Some("Lyon"));

    let err = ctx
        .profiles
        .update_profile(
            &id,
            UpdateProfileRequest {
                name: Some("   ".into()),
                ..UpdateProfileRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_profile_for_unknown_user_is_not_found() {
    let ctx = TestContext::new();
    let err = ctx.profiles.get_profile(&UserId::new("ghost")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_declaring_skills_is_idempotent_and_shares_the_catalog() {
    let ctx = TestContext::new();
    ctx.user("a", "Alice").await;
    ctx.user("b", "Bruno").await;

    let first = ctx.profiles.add_teach_skill(&UserId::new("a"), "Guitar").await.unwrap();
    let again = ctx.profiles.add_teach_skill(&UserId::new("a"), " guitar ").await.unwrap();
    let learned = ctx.profiles.add_learn_skill(&UserId::new("b"), "GUITAR").await.unwrap();

    assert_eq!(first.id, again.id);
    assert_eq!(first.id, learned.id);

    let catalog = ctx.profiles.list_skills().await.unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name.as_str(), "Guitar");

    let profile = ctx.profiles.get_profile(&UserId::new("a")).await.unwrap();
    assert_eq!(profile.teaches.len(), 1);
    assert!(!profile.teaches[0].verified);
    assert_eq!(profile.teaches[0].score, None);
    assert!(profile.learns.is_empty());
}

#[tokio::test]
async fn test_declaring_skill_for_unknown_user_fails() {
    let ctx = TestContext::new();
    let err = ctx
        .profiles
        .add_learn_skill(&UserId::new("ghost"), "French")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_removing_undeclared_skill_is_not_found() {
    let ctx = TestContext::new();
    ctx.user("a", "Alice").await;
    ctx.learns("a", "French").await;

    let err = ctx
        .profiles
        .remove_teach_skill(&UserId::new("a"), "French")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    ctx.profiles
        .remove_learn_skill(&UserId::new("a"), "french")
        .await
        .unwrap();
    let profile = ctx.profiles.get_profile(&UserId::new("a")).await.unwrap();
    assert!(profile.learns.is_empty());
}

#[tokio::test]
async fn test_verification_requires_a_declared_teach_skill() {
    let ctx = TestContext::new();
    ctx.user("a", "Alice").await;
    ctx.learns("a", "French").await;

    let err = ctx
        .profiles
        .record_verification(RecordVerificationRequest {
            user_id: UserId::new("a"),
            skill_name: "French".into(),
            verified: true,
            score: 90.0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_verification_is_upserted_with_latest_score() {
    let ctx = TestContext::new();
    ctx.user("a", "Alice").await;
    ctx.teaches("a", "Guitar").await;

    ctx.verify("a", "Guitar", false).await;
    let stored = ctx
        .profiles
        .record_verification(RecordVerificationRequest {
            user_id: UserId::new("a"),
            skill_name: "guitar".into(),
            verified: true,
            score: 92.5,
        })
        .await
        .unwrap();
    assert!(stored.verified);

    let profile = ctx.profiles.get_profile(&UserId::new("a")).await.unwrap();
    assert_eq!(profile.teaches.len(), 1);
    assert!(profile.teaches[0].verified);
    assert_eq!(profile.teaches[0].score, Some(92.5));
}

#[tokio::test]
async fn test_verification_score_out_of_range_is_rejected() {
    let ctx = TestContext::new();
    ctx.user("a", "Alice").await;
    ctx.teaches("a", "Guitar").await;

    let err = ctx
        .profiles
        .record_verification(RecordVerificationRequest {
            user_id: UserId::new("a"),
            skill_name: "Guitar".into(),
            verified: true,
            score: 140.0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
