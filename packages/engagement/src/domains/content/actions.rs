//! Content item lifecycle actions owned by the engagement core.

use chrono::Utc;
use tracing::{info, instrument};

use super::models::{ContentItem, NewContentItem};
use crate::common::{ContentItemId, EngagementError, EngagementResult};
use crate::kernel::store::{StoreError, Version};
use crate::kernel::write::{load_item, storage_error};
use crate::kernel::EngagementDeps;

/// Persist a new content item with empty aggregates.
#[instrument(skip(deps, new), fields(item_id = %new.id, author_id = %new.author_id))]
pub async fn create_content_item(
    deps: &EngagementDeps,
    new: NewContentItem,
) -> EngagementResult<ContentItem> {
    let mut item = new.into_item(Utc::now())?;

    match deps.store.compare_and_swap(item.id, Version::NONE, &item).await {
        Ok(version) => {
            item.version = version;
            info!(is_poll = item.is_poll(), "content item created");
            Ok(item)
        }
        Err(StoreError::Conflict) => Err(EngagementError::Storage(anyhow::anyhow!(
            "content item {} already exists",
            item.id
        ))),
        Err(e) => Err(storage_error(e)),
    }
}

pub async fn get_content_item(
    deps: &EngagementDeps,
    item_id: ContentItemId,
) -> EngagementResult<ContentItem> {
    load_item(deps, item_id).await
}

pub async fn content_item_exists(
    deps: &EngagementDeps,
    item_id: ContentItemId,
) -> EngagementResult<bool> {
    deps.store.exists(item_id).await.map_err(storage_error)
}
