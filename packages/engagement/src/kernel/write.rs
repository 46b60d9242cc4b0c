//! Optimistic read-modify-write for a single content item.
//!
//! Load the record, apply the mutation to a private copy, write it back
//! conditionally on the loaded version. On conflict, start over from a fresh
//! load. Nothing outside this function ever sees the copy until it commits.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::deps::EngagementDeps;
use super::store::StoreError;
use crate::common::{ContentItemId, EngagementError, EngagementResult};
use crate::domains::content::ContentItem;

/// Result of a committed (or skipped) mutation.
#[derive(Debug, Clone)]
pub struct Committed {
    /// The stored record after the operation.
    pub item: ContentItem,
    /// False when the mutation was a no-op and nothing was written.
    pub changed: bool,
}

pub async fn load_item(deps: &EngagementDeps, id: ContentItemId) -> EngagementResult<ContentItem> {
    deps.store
        .load(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| EngagementError::item_not_found(id))
}

/// Run `apply` under the optimistic write loop.
///
/// `apply` returns whether it changed the record. Errors from `apply` abort
/// before any write. A no-op skips the write and leaves the version alone.
pub async fn mutate_item<F>(
    deps: &EngagementDeps,
    id: ContentItemId,
    mut apply: F,
) -> EngagementResult<Committed>
where
    F: FnMut(&mut ContentItem, DateTime<Utc>) -> EngagementResult<bool>,
{
    let max_attempts = deps.policy.max_attempts;

    for attempt in 1..=max_attempts {
        let current = load_item(deps, id).await?;
        let now = Utc::now();

        let mut next = current.clone();
        if !apply(&mut next, now)? {
            debug!(item_id = %id, version = %current.version, "no-op mutation, skipping write");
            return Ok(Committed {
                item: current,
                changed: false,
            });
        }
        next.updated_at = now;

        match deps.store.compare_and_swap(id, current.version, &next).await {
            Ok(version) => {
                next.version = version;
                debug!(item_id = %id, version = %version, attempt, "mutation committed");
                return Ok(Committed {
                    item: next,
                    changed: true,
                });
            }
            Err(StoreError::Conflict) => {
                warn!(
                    item_id = %id,
                    expected = %current.version,
                    attempt,
                    max_attempts,
                    "concurrent write detected, retrying"
                );
            }
            Err(StoreError::Backend(e)) => return Err(EngagementError::Storage(e)),
        }
    }

    Err(EngagementError::Contention {
        attempts: max_attempts,
    })
}

pub(crate) fn storage_error(err: StoreError) -> EngagementError {
    match err {
        StoreError::Backend(e) => EngagementError::Storage(e),
        StoreError::Conflict => {
            EngagementError::Storage(anyhow::anyhow!("unexpected conflict on read"))
        }
    }
}
