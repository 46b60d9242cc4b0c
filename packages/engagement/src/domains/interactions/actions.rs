//! Interaction actions - entry points for bucket toggles
//!
//! Callers pass an already-authenticated member id and an already-resolved
//! content item id. Each action is one optimistic write on one item.

use tracing::{info, instrument};

use super::engine;
use super::models::{BucketName, DesiredState, InteractionSummary, Reaction};
use crate::common::{ContentItemId, EngagementResult, MemberId};
use crate::domains::content::ContentItem;
use crate::domains::events::EngagementEvent;
use crate::kernel::write::{load_item, mutate_item};
use crate::kernel::EngagementDeps;

const REACTION_BUCKETS: [BucketName; 2] = [BucketName::Likes, BucketName::Dislikes];

#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    pub item: ContentItem,
    pub changed: bool,
}

/// Add or remove `user_id` in `bucket`. Repeating a toggle reports
/// `changed: false` and writes nothing.
#[instrument(skip(deps))]
pub async fn toggle_interaction(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    bucket: BucketName,
    user_id: MemberId,
    desired: DesiredState,
) -> EngagementResult<ToggleOutcome> {
    let committed = mutate_item(deps, item_id, |item, now| {
        Ok(engine::toggle(item, bucket, user_id, desired, now))
    })
    .await?;

    if committed.changed {
        info!(
            count = committed.item.interactions.get(bucket).count(),
            "interaction toggled"
        );
        deps.notify(EngagementEvent::InteractionChanged {
            item_id,
            author_id: committed.item.author_id,
            bucket,
            user_id,
            state: desired,
        })
        .await;
    }

    Ok(ToggleOutcome {
        item: committed.item,
        changed: committed.changed,
    })
}

/// Set a like/dislike reaction in one write. Emits one event per bucket
/// whose membership actually changed.
#[instrument(skip(deps))]
pub async fn set_reaction(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    user_id: MemberId,
    reaction: Reaction,
) -> EngagementResult<ToggleOutcome> {
    // Recomputed on every attempt so it describes the write that committed
    let mut transitions: Vec<(BucketName, DesiredState)> = Vec::new();
    let committed = mutate_item(deps, item_id, |item, now| {
        let before = REACTION_BUCKETS.map(|b| item.interactions.get(b).contains(user_id));
        let changed = engine::apply_reaction(item, user_id, reaction, now);
        transitions = REACTION_BUCKETS
            .iter()
            .zip(before)
            .filter_map(|(&bucket, was)| {
                let is = item.interactions.get(bucket).contains(user_id);
                (was != is).then_some((bucket, DesiredState::from(is)))
            })
            .collect();
        Ok(changed)
    })
    .await?;

    if committed.changed {
        info!(?reaction, "reaction set");
        for (bucket, state) in transitions {
            deps.notify(EngagementEvent::InteractionChanged {
                item_id,
                author_id: committed.item.author_id,
                bucket,
                user_id,
                state,
            })
            .await;
        }
    }

    Ok(ToggleOutcome {
        item: committed.item,
        changed: committed.changed,
    })
}

pub async fn interaction_summary(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    viewer: Option<MemberId>,
) -> EngagementResult<InteractionSummary> {
    let item = load_item(deps, item_id).await?;
    Ok(InteractionSummary::for_viewer(&item.interactions, viewer))
}
