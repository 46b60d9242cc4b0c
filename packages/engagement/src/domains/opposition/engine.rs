//! Pure edge manipulation on a single content item.

use chrono::{DateTime, Utc};

use super::models::OppositionEdge;
use crate::common::{ContentItemId, EngagementError, EngagementResult};
use crate::domains::content::ContentItem;

/// Content by the same author cannot oppose itself.
pub fn ensure_distinct_authors(opposing: &ContentItem, opposed: &ContentItem) -> EngagementResult<()> {
    if opposing.author_id == opposed.author_id {
        return Err(EngagementError::SelfOppositionRejected);
    }
    Ok(())
}

pub fn has_outgoing(item: &ContentItem, target: ContentItemId) -> bool {
    item.opposition_links.iter().any(|e| e.target_id == target)
}

pub fn has_incoming(item: &ContentItem, source: ContentItemId) -> bool {
    item.opposed_by_links.iter().any(|e| e.target_id == source)
}

/// Append `item -> target` unless an edge to `target` already exists.
pub fn link_outgoing(
    item: &mut ContentItem,
    target: ContentItemId,
    description: &str,
    now: DateTime<Utc>,
) -> bool {
    if has_outgoing(item, target) {
        return false;
    }
    item.opposition_links.push(OppositionEdge {
        target_id: target,
        description: description.to_string(),
        linked_at: now,
    });
    true
}

/// Append the mirror of `source -> item`. An existing mirror carrying a
/// different description is rewritten to `description`.
pub fn link_incoming(
    item: &mut ContentItem,
    source: ContentItemId,
    description: &str,
    now: DateTime<Utc>,
) -> bool {
    if let Some(edge) = item
        .opposed_by_links
        .iter_mut()
        .find(|e| e.target_id == source)
    {
        if edge.description == description {
            return false;
        }
        edge.description = description.to_string();
        return true;
    }
    item.opposed_by_links.push(OppositionEdge {
        target_id: source,
        description: description.to_string(),
        linked_at: now,
    });
    true
}

/// Drop the `item -> target` edge. Used to undo [`link_outgoing`].
pub fn unlink_outgoing(item: &mut ContentItem, target: ContentItemId) -> bool {
    let before = item.opposition_links.len();
    item.opposition_links.retain(|e| e.target_id != target);
    item.opposition_links.len() != before
}

/// Edges stripped from one item by [`strip_edges`], kept so a failed
/// two-record write can put them back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrippedEdges {
    pub outgoing: Vec<OppositionEdge>,
    pub incoming: Vec<OppositionEdge>,
}

impl StrippedEdges {
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}

/// Remove every edge, in either list, that references `other`.
pub fn strip_edges(item: &mut ContentItem, other: ContentItemId) -> StrippedEdges {
    let (outgoing, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut item.opposition_links)
        .into_iter()
        .partition(|e| e.target_id == other);
    item.opposition_links = kept;

    let (incoming, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut item.opposed_by_links)
        .into_iter()
        .partition(|e| e.target_id == other);
    item.opposed_by_links = kept;

    StrippedEdges { outgoing, incoming }
}

/// Put back edges removed by [`strip_edges`] that are not present again.
pub fn restore_edges(item: &mut ContentItem, edges: &StrippedEdges) -> bool {
    let mut changed = false;
    for edge in &edges.outgoing {
        if !has_outgoing(item, edge.target_id) {
            item.opposition_links.push(edge.clone());
            changed = true;
        }
    }
    for edge in &edges.incoming {
        if !has_incoming(item, edge.target_id) {
            item.opposed_by_links.push(edge.clone());
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MemberId;

    fn item() -> ContentItem {
        ContentItem::empty(ContentItemId::new(), MemberId::new(), Utc::now())
    }

    #[test]
    fn link_outgoing_is_idempotent_by_target() {
        let mut a = item();
        let b = ContentItemId::new();
        let now = Utc::now();

        assert!(link_outgoing(&mut a, b, "rebuttal", now));
        assert!(!link_outgoing(&mut a, b, "different words", now));
        assert_eq!(a.opposition_links.len(), 1);
        assert_eq!(a.opposition_links[0].description, "rebuttal");
    }

    #[test]
    fn link_incoming_rewrites_stale_mirror_description() {
        let mut b = item();
        let a = ContentItemId::new();
        let now = Utc::now();

        assert!(link_incoming(&mut b, a, "old", now));
        assert!(!link_incoming(&mut b, a, "old", now));
        assert!(link_incoming(&mut b, a, "new", now));
        assert_eq!(b.opposed_by_links.len(), 1);
        assert_eq!(b.opposed_by_links[0].description, "new");
    }

    #[test]
    fn same_author_is_rejected() {
        let a = item();
        let mut b = item();
        b.author_id = a.author_id;

        assert!(matches!(
            ensure_distinct_authors(&a, &b),
            Err(EngagementError::SelfOppositionRejected)
        ));
        assert!(ensure_distinct_authors(&a, &item()).is_ok());
    }

    #[test]
    fn strip_and_restore_round_trip() {
        let mut a = item();
        let b = ContentItemId::new();
        let c = ContentItemId::new();
        let now = Utc::now();

        link_outgoing(&mut a, b, "ab", now);
        link_outgoing(&mut a, c, "ac", now);
        link_incoming(&mut a, b, "ba", now);
        let original = a.clone();

        let stripped = strip_edges(&mut a, b);
        assert_eq!(stripped.outgoing.len(), 1);
        assert_eq!(stripped.incoming.len(), 1);
        assert_eq!(a.opposition_links.len(), 1);
        assert_eq!(a.opposition_links[0].target_id, c);
        assert!(a.opposed_by_links.is_empty());

        assert!(restore_edges(&mut a, &stripped));
        assert!(has_outgoing(&a, b));
        assert!(has_incoming(&a, b));
        assert!(!restore_edges(&mut a, &stripped));
        assert_eq!(a.opposition_links.len(), original.opposition_links.len());
    }

    #[test]
    fn strip_without_edges_is_empty() {
        let mut a = item();
        assert!(strip_edges(&mut a, ContentItemId::new()).is_empty());
    }
}
