//! Orientation voting actions.

use tracing::{info, instrument};

use super::models::{Orientation, OrientationSummary};
use crate::common::{ContentItemId, EngagementResult, MemberId};
use crate::domains::content::ContentItem;
use crate::domains::events::EngagementEvent;
use crate::kernel::write::{load_item, mutate_item};
use crate::kernel::EngagementDeps;

#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub item: ContentItem,
    pub changed: bool,
}

/// Cast or change `user_id`'s orientation vote on an item.
///
/// Parse free-form input with `Orientation::from_str` first; unknown
/// categories fail there with `InvalidCategory`.
#[instrument(skip(deps))]
pub async fn cast_orientation_vote(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    user_id: MemberId,
    category: Orientation,
) -> EngagementResult<VoteOutcome> {
    let committed = mutate_item(deps, item_id, |item, now| {
        Ok(item.orientation.cast(user_id, category, now))
    })
    .await?;

    if committed.changed {
        let resolved_view = committed.item.orientation.resolved_view();
        info!(%resolved_view, "orientation vote recorded");
        deps.notify(EngagementEvent::OrientationVoteCast {
            item_id,
            user_id,
            category,
            resolved_view,
        })
        .await;
    }

    Ok(VoteOutcome {
        item: committed.item,
        changed: committed.changed,
    })
}

#[instrument(skip(deps))]
pub async fn retract_orientation_vote(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    user_id: MemberId,
) -> EngagementResult<VoteOutcome> {
    let committed = mutate_item(deps, item_id, |item, _now| {
        Ok(item.orientation.retract(user_id))
    })
    .await?;

    if committed.changed {
        let resolved_view = committed.item.orientation.resolved_view();
        info!(%resolved_view, "orientation vote retracted");
        deps.notify(EngagementEvent::OrientationVoteRetracted {
            item_id,
            user_id,
            resolved_view,
        })
        .await;
    }

    Ok(VoteOutcome {
        item: committed.item,
        changed: committed.changed,
    })
}

pub fn orientation_summary(item: &ContentItem, viewer: Option<MemberId>) -> OrientationSummary {
    let ballot = &item.orientation;
    OrientationSummary {
        tally: *ballot.tally(),
        total_votes: ballot.tally().total(),
        resolved_view: ballot.resolved_view(),
        declared_orientation: item.declared_orientation,
        viewer_vote: viewer
            .and_then(|v| ballot.ballot_for(v))
            .map(|b| b.category),
    }
}

pub async fn load_orientation_summary(
    deps: &EngagementDeps,
    item_id: ContentItemId,
    viewer: Option<MemberId>,
) -> EngagementResult<OrientationSummary> {
    let item = load_item(deps, item_id).await?;
    Ok(orientation_summary(&item, viewer))
}
