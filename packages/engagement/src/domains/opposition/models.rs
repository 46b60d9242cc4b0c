use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ContentItemId;
use crate::domains::content::ContentItem;

/// One side of a paired opposition link.
///
/// In `opposition_links` the target is the item being opposed; in
/// `opposed_by_links` it is the item doing the opposing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OppositionEdge {
    pub target_id: ContentItemId,
    pub description: String,
    pub linked_at: DateTime<Utc>,
}

/// An edge whose target resolved at read time.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedOpposition {
    pub edge: OppositionEdge,
    pub target: ContentItem,
}

/// Which list of a content item to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// Items this one opposes.
    Opposes,
    /// Items opposing this one.
    OpposedBy,
}
