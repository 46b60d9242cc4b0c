use std::collections::BTreeSet;

use serde::Serialize;

use crate::common::{ContentItemId, MemberId, PollOptionId};
use crate::domains::interactions::models::{BucketName, DesiredState};
use crate::domains::orientation::models::Orientation;

/// Engagement domain events.
///
/// Immutable facts about committed changes, handed to the notifier. One is
/// emitted per actual state change; no-ops emit nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngagementEvent {
    InteractionChanged {
        item_id: ContentItemId,
        author_id: MemberId,
        bucket: BucketName,
        user_id: MemberId,
        state: DesiredState,
    },

    OrientationVoteCast {
        item_id: ContentItemId,
        user_id: MemberId,
        category: Orientation,
        resolved_view: Orientation,
    },

    OrientationVoteRetracted {
        item_id: ContentItemId,
        user_id: MemberId,
        resolved_view: Orientation,
    },

    OppositionAdded {
        opposing_id: ContentItemId,
        opposed_id: ContentItemId,
        opposed_author_id: MemberId,
        description: String,
    },

    OppositionRemoved {
        opposing_id: ContentItemId,
        opposed_id: ContentItemId,
    },

    PollVoteCast {
        item_id: ContentItemId,
        user_id: MemberId,
        option_ids: BTreeSet<PollOptionId>,
    },

    PollVoteRemoved {
        item_id: ContentItemId,
        user_id: MemberId,
    },
}

impl EngagementEvent {
    /// The content item the event is primarily about.
    pub fn item_id(&self) -> ContentItemId {
        match self {
            EngagementEvent::InteractionChanged { item_id, .. }
            | EngagementEvent::OrientationVoteCast { item_id, .. }
            | EngagementEvent::OrientationVoteRetracted { item_id, .. }
            | EngagementEvent::PollVoteCast { item_id, .. }
            | EngagementEvent::PollVoteRemoved { item_id, .. } => *item_id,
            EngagementEvent::OppositionAdded { opposing_id, .. }
            | EngagementEvent::OppositionRemoved { opposing_id, .. } => *opposing_id,
        }
    }
}
