//! Fixture builders shared by the integration tests.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use engagement_core::common::{MemberId, PollOptionId};
use engagement_core::domains::content::{create_content_item, ContentItem, NewContentItem};
use engagement_core::domains::polls::PollSpec;
use engagement_core::kernel::EngagementDeps;

/// A plain content item by a fresh author.
pub async fn create_item(deps: &EngagementDeps) -> ContentItem {
    create_item_by(deps, MemberId::new()).await
}

pub async fn create_item_by(deps: &EngagementDeps, author_id: MemberId) -> ContentItem {
    create_content_item(deps, NewContentItem::builder().author_id(author_id).build())
        .await
        .expect("Failed to create content item")
}

pub async fn create_poll(
    deps: &EngagementDeps,
    options: &[&str],
    is_multiple_choice: bool,
    expires_at: Option<DateTime<Utc>>,
) -> ContentItem {
    let spec = PollSpec {
        options: options.iter().map(|o| o.to_string()).collect(),
        is_multiple_choice,
        expires_at,
    };
    create_content_item(
        deps,
        NewContentItem::builder()
            .author_id(MemberId::new())
            .poll(spec)
            .build(),
    )
    .await
    .expect("Failed to create poll")
}

/// Option ids of a poll item, in display order.
pub fn option_ids(item: &ContentItem) -> Vec<PollOptionId> {
    item.poll
        .as_ref()
        .expect("item has no poll")
        .options()
        .iter()
        .map(|o| o.id)
        .collect()
}

pub fn choice(ids: &[PollOptionId]) -> BTreeSet<PollOptionId> {
    ids.iter().copied().collect()
}
