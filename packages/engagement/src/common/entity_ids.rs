//! Typed ID definitions for the engagement entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for members (the authenticated actors and authors).
pub struct Member;

/// Marker type for content items (posts carrying the aggregates).
pub struct ContentItem;

/// Marker type for poll options.
pub struct PollOption;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Opaque identity reference, compared for equality only.
pub type MemberId = Id<Member>;

pub type ContentItemId = Id<ContentItem>;

pub type PollOptionId = Id<PollOption>;
