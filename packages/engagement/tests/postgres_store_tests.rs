//! Postgres store tests against a real database.
//!
//! These start a container through testcontainers, so they are ignored by
//! default. Run with: cargo test -p engagement --test postgres_store_tests -- --ignored

mod common;

use crate::common::{create_item, PgHarness};
use engagement_core::common::MemberId;
use engagement_core::domains::audit;
use engagement_core::domains::interactions::{toggle_interaction, BucketName, DesiredState};
use engagement_core::kernel::{ContentStore, StoreError, Version};
use test_context::test_context;

#[test_context(PgHarness)]
#[tokio::test]
#[ignore = "requires docker"]
async fn versions_advance_with_each_write(ctx: &PgHarness) {
    let item = create_item(&ctx.deps).await;
    assert_eq!(item.version, Version::new(1));

    let outcome = toggle_interaction(
        &ctx.deps,
        item.id,
        BucketName::Likes,
        MemberId::new(),
        DesiredState::Present,
    )
    .await
    .unwrap();

    let stored = ctx.store.load(item.id).await.unwrap().unwrap();
    assert_eq!(stored.version, Version::new(2));
    assert_eq!(stored, outcome.item);
    assert!(audit::check(&stored).is_empty());
}

#[test_context(PgHarness)]
#[tokio::test]
#[ignore = "requires docker"]
async fn stale_version_conflicts(ctx: &PgHarness) {
    let item = create_item(&ctx.deps).await;

    ctx.store
        .compare_and_swap(item.id, item.version, &item)
        .await
        .unwrap();
    let stale = ctx.store.compare_and_swap(item.id, item.version, &item).await;
    let duplicate = ctx.store.compare_and_swap(item.id, Version::NONE, &item).await;

    assert!(matches!(stale, Err(StoreError::Conflict)));
    assert!(matches!(duplicate, Err(StoreError::Conflict)));
}

#[test_context(PgHarness)]
#[tokio::test]
#[ignore = "requires docker"]
async fn pages_cover_every_item(ctx: &PgHarness) {
    let mut created = Vec::new();
    for _ in 0..5 {
        created.push(create_item(&ctx.deps).await.id);
    }

    let mut seen = Vec::new();
    let mut after = None;
    loop {
        let page = ctx.store.load_page(after, 2).await.unwrap();
        let Some(last) = page.last() else {
            break;
        };
        after = Some(last.id);
        seen.extend(page.iter().map(|i| i.id));
    }

    // The shared database may hold rows from other tests
    assert!(created.iter().all(|id| seen.contains(id)));
    let mut sorted = seen.clone();
    sorted.sort();
    assert_eq!(seen, sorted);
    assert!(ctx.store.exists(created[0]).await.unwrap());
}
