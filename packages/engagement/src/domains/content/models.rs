use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::{ContentItemId, EngagementResult, MemberId};
use crate::domains::interactions::models::InteractionBuckets;
use crate::domains::opposition::models::OppositionEdge;
use crate::domains::orientation::models::{Orientation, OrientationBallot};
use crate::domains::polls::models::{PollBallot, PollSpec};
use crate::kernel::store::Version;

/// A shareable post and every engagement aggregate attached to it.
///
/// Persisted as one record. The sub-entities are only changed through the
/// engines, which always rebuild derived counts from their source sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentItemId,
    pub author_id: MemberId,

    /// Orientation declared by the author. Never derived from votes.
    pub declared_orientation: Option<Orientation>,

    // Aggregates
    pub interactions: InteractionBuckets,
    pub orientation: OrientationBallot,
    pub opposition_links: Vec<OppositionEdge>,
    pub opposed_by_links: Vec<OppositionEdge>,
    pub poll: Option<PollBallot>,

    /// Bumped by the store on every committed write.
    pub version: Version,

    // Soft delete is owned elsewhere; edges to deleted items are hidden on read
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// A never-persisted item with every aggregate empty.
    pub fn empty(id: ContentItemId, author_id: MemberId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            author_id,
            declared_orientation: None,
            interactions: InteractionBuckets::default(),
            orientation: OrientationBallot::default(),
            opposition_links: Vec::new(),
            opposed_by_links: Vec::new(),
            poll: None,
            version: Version::NONE,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_poll(&self) -> bool {
        self.poll.is_some()
    }
}

/// Input for creating a content item.
#[derive(Debug, Clone, TypedBuilder)]
pub struct NewContentItem {
    #[builder(default = ContentItemId::new())]
    pub id: ContentItemId,
    pub author_id: MemberId,
    #[builder(default, setter(strip_option))]
    pub declared_orientation: Option<Orientation>,
    #[builder(default, setter(strip_option))]
    pub poll: Option<PollSpec>,
}

impl NewContentItem {
    pub fn into_item(self, now: DateTime<Utc>) -> EngagementResult<ContentItem> {
        let mut item = ContentItem::empty(self.id, self.author_id, now);
        item.declared_orientation = self.declared_orientation;
        item.poll = self.poll.as_ref().map(PollBallot::from_spec).transpose()?;
        Ok(item)
    }
}
