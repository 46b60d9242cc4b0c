//! Pure toggle logic. No I/O; callers own loading and persisting.

use chrono::{DateTime, Utc};

use super::models::{BucketName, DesiredState, Reaction};
use crate::common::MemberId;
use crate::domains::content::ContentItem;

/// Move `user_id` into or out of `bucket`. Returns whether anything changed.
pub fn toggle(
    item: &mut ContentItem,
    bucket: BucketName,
    user_id: MemberId,
    desired: DesiredState,
    now: DateTime<Utc>,
) -> bool {
    let bucket = item.interactions.get_mut(bucket);
    match desired {
        DesiredState::Present => bucket.insert(user_id, now),
        DesiredState::Absent => bucket.remove(user_id),
    }
}

/// Set the user's like/dislike reaction, keeping the two buckets exclusive.
pub fn apply_reaction(
    item: &mut ContentItem,
    user_id: MemberId,
    reaction: Reaction,
    now: DateTime<Utc>,
) -> bool {
    let (likes, dislikes) = match reaction {
        Reaction::Like => (DesiredState::Present, DesiredState::Absent),
        Reaction::Dislike => (DesiredState::Absent, DesiredState::Present),
        Reaction::None => (DesiredState::Absent, DesiredState::Absent),
    };

    let liked = toggle(item, BucketName::Likes, user_id, likes, now);
    let disliked = toggle(item, BucketName::Dislikes, user_id, dislikes, now);
    liked || disliked
}
