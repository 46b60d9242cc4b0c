//! Integration tests for the interaction toggle engine.
//!
//! - toggle_interaction: idempotent add/remove in a named bucket
//! - set_reaction: exclusive like/dislike in one write
//! - interaction_summary: counts plus the viewer's own memberships

mod common;

use crate::common::{create_item, TestHarness};
use engagement_core::common::{ContentItemId, EngagementError, MemberId};
use engagement_core::domains::events::EngagementEvent;
use engagement_core::domains::interactions::{
    interaction_summary, set_reaction, toggle_interaction, BucketName, DesiredState, Reaction,
};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn like_adds_member_and_recounts(ctx: &TestHarness) {
    let item = create_item(&ctx.deps).await;
    let user = MemberId::new();

    let outcome = toggle_interaction(
        &ctx.deps,
        item.id,
        BucketName::Likes,
        user,
        DesiredState::Present,
    )
    .await
    .unwrap();

    assert!(outcome.changed);
    let likes = outcome.item.interactions.get(BucketName::Likes);
    assert_eq!(likes.count(), 1);
    assert!(likes.contains(user));
    assert_eq!(outcome.item.version.value(), item.version.value() + 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn repeated_toggle_is_unchanged_and_silent(ctx: &TestHarness) {
    let item = create_item(&ctx.deps).await;
    let user = MemberId::new();

    toggle_interaction(&ctx.deps, item.id, BucketName::Bookmarks, user, DesiredState::Present)
        .await
        .unwrap();
    let commits_before = ctx.store.commits();

    let repeat = toggle_interaction(
        &ctx.deps,
        item.id,
        BucketName::Bookmarks,
        user,
        DesiredState::Present,
    )
    .await
    .unwrap();

    assert!(!repeat.changed);
    assert_eq!(repeat.item.interactions.get(BucketName::Bookmarks).count(), 1);
    assert_eq!(ctx.store.commits(), commits_before, "no-op must not write");
    assert_eq!(ctx.notifier.events().len(), 1, "no-op must not notify");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn removing_absent_member_is_a_no_op(ctx: &TestHarness) {
    let item = create_item(&ctx.deps).await;

    let outcome = toggle_interaction(
        &ctx.deps,
        item.id,
        BucketName::Reports,
        MemberId::new(),
        DesiredState::Absent,
    )
    .await
    .unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.item.version, item.version);
    assert!(ctx.notifier.events().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn toggle_emits_one_event_per_change(ctx: &TestHarness) {
    let item = create_item(&ctx.deps).await;
    let user = MemberId::new();

    toggle_interaction(&ctx.deps, item.id, BucketName::Likes, user, DesiredState::Present)
        .await
        .unwrap();
    toggle_interaction(&ctx.deps, item.id, BucketName::Likes, user, DesiredState::Absent)
        .await
        .unwrap();

    assert_eq!(
        ctx.notifier.events(),
        vec![
            EngagementEvent::InteractionChanged {
                item_id: item.id,
                author_id: item.author_id,
                bucket: BucketName::Likes,
                user_id: user,
                state: DesiredState::Present,
            },
            EngagementEvent::InteractionChanged {
                item_id: item.id,
                author_id: item.author_id,
                bucket: BucketName::Likes,
                user_id: user,
                state: DesiredState::Absent,
            },
        ]
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn toggle_on_missing_item_is_not_found(ctx: &TestHarness) {
    let result = toggle_interaction(
        &ctx.deps,
        ContentItemId::new(),
        BucketName::Likes,
        MemberId::new(),
        DesiredState::Present,
    )
    .await;

    assert!(matches!(result, Err(EngagementError::NotFound { .. })));
}

#[test]
fn unknown_bucket_name_is_rejected() {
    let err = "favorites".parse::<BucketName>().unwrap_err();
    assert!(matches!(err, EngagementError::InvalidBucket(name) if name == "favorites"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn switching_reaction_moves_between_buckets(ctx: &TestHarness) {
    let item = create_item(&ctx.deps).await;
    let user = MemberId::new();

    set_reaction(&ctx.deps, item.id, user, Reaction::Like).await.unwrap();
    ctx.notifier.clear();

    let outcome = set_reaction(&ctx.deps, item.id, user, Reaction::Dislike)
        .await
        .unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.item.interactions.get(BucketName::Likes).count(), 0);
    assert_eq!(outcome.item.interactions.get(BucketName::Dislikes).count(), 1);

    let buckets: Vec<_> = ctx
        .notifier
        .events()
        .into_iter()
        .map(|e| match e {
            EngagementEvent::InteractionChanged { bucket, state, .. } => (bucket, state),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(
        buckets,
        vec![
            (BucketName::Likes, DesiredState::Absent),
            (BucketName::Dislikes, DesiredState::Present),
        ]
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn summary_reports_viewer_membership(ctx: &TestHarness) {
    let item = create_item(&ctx.deps).await;
    let viewer = MemberId::new();

    toggle_interaction(&ctx.deps, item.id, BucketName::Likes, viewer, DesiredState::Present)
        .await
        .unwrap();
    toggle_interaction(
        &ctx.deps,
        item.id,
        BucketName::Likes,
        MemberId::new(),
        DesiredState::Present,
    )
    .await
    .unwrap();

    let mine = interaction_summary(&ctx.deps, item.id, Some(viewer))
        .await
        .unwrap();
    let likes = mine.get(BucketName::Likes).unwrap();
    assert_eq!(likes.count, 2);
    assert!(likes.viewer_is_member);
    assert!(!mine.get(BucketName::Bookmarks).unwrap().viewer_is_member);

    let anonymous = interaction_summary(&ctx.deps, item.id, None).await.unwrap();
    assert!(!anonymous.get(BucketName::Likes).unwrap().viewer_is_member);
}
