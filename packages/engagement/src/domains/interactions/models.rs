use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{EngagementError, MemberId};

// =============================================================================
// Enums
// =============================================================================

/// Named interaction buckets carried by every content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketName {
    Likes,
    Dislikes,
    Bookmarks,
    CommentFlags,
    Reports,
}

impl BucketName {
    pub const ALL: [BucketName; 5] = [
        BucketName::Likes,
        BucketName::Dislikes,
        BucketName::Bookmarks,
        BucketName::CommentFlags,
        BucketName::Reports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketName::Likes => "likes",
            BucketName::Dislikes => "dislikes",
            BucketName::Bookmarks => "bookmarks",
            BucketName::CommentFlags => "comment_flags",
            BucketName::Reports => "reports",
        }
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BucketName {
    type Err = EngagementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "likes" => Ok(BucketName::Likes),
            "dislikes" => Ok(BucketName::Dislikes),
            "bookmarks" => Ok(BucketName::Bookmarks),
            "comment_flags" | "commentFlags" => Ok(BucketName::CommentFlags),
            "reports" => Ok(BucketName::Reports),
            _ => Err(EngagementError::InvalidBucket(s.to_string())),
        }
    }
}

/// Requested membership of the actor in a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    Present,
    Absent,
}

impl From<bool> for DesiredState {
    fn from(present: bool) -> Self {
        if present {
            DesiredState::Present
        } else {
            DesiredState::Absent
        }
    }
}

/// Mutually exclusive like/dislike reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Like,
    Dislike,
    None,
}

// =============================================================================
// Buckets
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketMember {
    pub user_id: MemberId,
    pub added_at: DateTime<Utc>,
}

/// A set of members, unique by user, with a count derived from it.
///
/// `count` is rewritten from `members` after every change and is never
/// adjusted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionBucket {
    members: Vec<BucketMember>,
    count: u32,
}

impl InteractionBucket {
    pub fn members(&self) -> &[BucketMember] {
        &self.members
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn contains(&self, user_id: MemberId) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Returns false if the user was already a member.
    pub(crate) fn insert(&mut self, user_id: MemberId, now: DateTime<Utc>) -> bool {
        if self.contains(user_id) {
            return false;
        }
        self.members.push(BucketMember {
            user_id,
            added_at: now,
        });
        self.recount();
        true
    }

    /// Returns false if the user was not a member.
    pub(crate) fn remove(&mut self, user_id: MemberId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.user_id != user_id);
        let removed = self.members.len() != before;
        if removed {
            self.recount();
        }
        removed
    }

    fn recount(&mut self) {
        self.count = self.members.len() as u32;
    }
}

/// All interaction buckets of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionBuckets {
    pub likes: InteractionBucket,
    pub dislikes: InteractionBucket,
    pub bookmarks: InteractionBucket,
    pub comment_flags: InteractionBucket,
    pub reports: InteractionBucket,
}

impl InteractionBuckets {
    pub fn get(&self, name: BucketName) -> &InteractionBucket {
        match name {
            BucketName::Likes => &self.likes,
            BucketName::Dislikes => &self.dislikes,
            BucketName::Bookmarks => &self.bookmarks,
            BucketName::CommentFlags => &self.comment_flags,
            BucketName::Reports => &self.reports,
        }
    }

    pub(crate) fn get_mut(&mut self, name: BucketName) -> &mut InteractionBucket {
        match name {
            BucketName::Likes => &mut self.likes,
            BucketName::Dislikes => &mut self.dislikes,
            BucketName::Bookmarks => &mut self.bookmarks,
            BucketName::CommentFlags => &mut self.comment_flags,
            BucketName::Reports => &mut self.reports,
        }
    }
}

// =============================================================================
// Read views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSummary {
    pub bucket: BucketName,
    pub count: u32,
    /// Whether the viewer is in this bucket. Always false for anonymous viewers.
    pub viewer_is_member: bool,
}

/// Per-bucket counts plus the viewer's own memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionSummary {
    pub buckets: Vec<BucketSummary>,
}

impl InteractionSummary {
    pub fn for_viewer(buckets: &InteractionBuckets, viewer: Option<MemberId>) -> Self {
        let buckets = BucketName::ALL
            .iter()
            .map(|&name| {
                let bucket = buckets.get(name);
                BucketSummary {
                    bucket: name,
                    count: bucket.count(),
                    viewer_is_member: viewer.map(|v| bucket.contains(v)).unwrap_or(false),
                }
            })
            .collect();
        Self { buckets }
    }

    pub fn get(&self, name: BucketName) -> Option<&BucketSummary> {
        self.buckets.iter().find(|b| b.bucket == name)
    }
}
