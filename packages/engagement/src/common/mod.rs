// Common types shared across the kernel and domain layers

pub mod entity_ids;
pub mod error;
pub mod id;

pub use entity_ids::{ContentItemId, MemberId, PollOptionId};
pub use error::{EngagementError, EngagementResult};
pub use id::Id;
