//! Poll voting actions.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{info, instrument};

use super::engine;
use super::models::PollResults;
use crate::common::{ContentItemId, EngagementError, EngagementResult, MemberId, PollOptionId};
use crate::domains::content::ContentItem;
use crate::domains::events::EngagementEvent;
use crate::kernel::write::{load_item, mutate_item};
use crate::kernel::EngagementDeps;

#[derive(Debug, Clone)]
pub struct PollVoteOutcome {
    pub item: ContentItem,
    pub changed: bool,
}

/// Cast or replace `user_id`'s ballot on the item's poll.
#[instrument(skip(deps))]
pub async fn cast_poll_vote(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    user_id: MemberId,
    option_ids: BTreeSet<PollOptionId>,
) -> EngagementResult<PollVoteOutcome> {
    let committed = mutate_item(deps, item_id, |item, now| {
        let poll = item
            .poll
            .as_mut()
            .ok_or_else(|| EngagementError::poll_not_found(item_id))?;
        engine::cast(poll, user_id, option_ids.clone(), now)
    })
    .await?;

    if committed.changed {
        info!(
            total_votes = committed.item.poll.as_ref().map(|p| p.total_votes()),
            "poll vote recorded"
        );
        deps.notify(EngagementEvent::PollVoteCast {
            item_id,
            user_id,
            option_ids,
        })
        .await;
    }

    Ok(PollVoteOutcome {
        item: committed.item,
        changed: committed.changed,
    })
}

#[instrument(skip(deps))]
pub async fn remove_poll_vote(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    user_id: MemberId,
) -> EngagementResult<PollVoteOutcome> {
    let committed = mutate_item(deps, item_id, |item, now| {
        let poll = item
            .poll
            .as_mut()
            .ok_or_else(|| EngagementError::poll_not_found(item_id))?;
        engine::retract(poll, user_id, now)
    })
    .await?;

    if committed.changed {
        info!("poll vote removed");
        deps.notify(EngagementEvent::PollVoteRemoved { item_id, user_id })
            .await;
    }

    Ok(PollVoteOutcome {
        item: committed.item,
        changed: committed.changed,
    })
}

pub async fn poll_results(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    viewer: Option<MemberId>,
) -> EngagementResult<PollResults> {
    let item = load_item(deps, item_id).await?;
    let poll = item
        .poll
        .as_ref()
        .ok_or_else(|| EngagementError::poll_not_found(item_id))?;
    Ok(PollResults::for_viewer(poll, viewer, Utc::now()))
}
