use chrono::{DateTime, Utc};
use thiserror::Error;

use super::ContentItemId;

/// Errors returned by every engagement operation.
///
/// Validation variants are raised before any write is attempted, so a
/// rejected operation never leaves partial state behind.
#[derive(Error, Debug)]
pub enum EngagementError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid interaction bucket: {0}")]
    InvalidBucket(String),

    #[error("Invalid orientation category: {0}")]
    InvalidCategory(String),

    #[error("Invalid vote: {0}")]
    InvalidVote(String),

    #[error("Cannot oppose content by the same author")]
    SelfOppositionRejected,

    #[error("Poll closed at {expired_at}")]
    PollExpired { expired_at: DateTime<Utc> },

    #[error("Gave up after {attempts} conflicting writes")]
    Contention { attempts: u32 },

    /// The first half of a two-record write landed but the second did not.
    /// `compensated` tells whether the first write was rolled back.
    #[error("Partial failure linking {first} and {second} (compensated: {compensated}): {cause}")]
    PartialFailure {
        first: ContentItemId,
        second: ContentItemId,
        compensated: bool,
        cause: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl EngagementError {
    pub fn item_not_found(id: ContentItemId) -> Self {
        EngagementError::NotFound {
            kind: "Content item",
            id: id.to_string(),
        }
    }

    pub fn poll_not_found(id: ContentItemId) -> Self {
        EngagementError::NotFound {
            kind: "Poll on content item",
            id: id.to_string(),
        }
    }

    /// Callers may retry the whole operation on these.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngagementError::Contention { .. } | EngagementError::PartialFailure { .. }
        )
    }
}

pub type EngagementResult<T> = std::result::Result<T, EngagementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_concurrency_failures_are_retryable() {
        assert!(EngagementError::Contention { attempts: 3 }.is_retryable());
        assert!(EngagementError::PartialFailure {
            first: ContentItemId::new(),
            second: ContentItemId::new(),
            compensated: true,
            cause: "boom".into(),
        }
        .is_retryable());
        assert!(!EngagementError::SelfOppositionRejected.is_retryable());
        assert!(!EngagementError::InvalidVote("empty".into()).is_retryable());
    }

    #[test]
    fn not_found_names_the_entity() {
        let id = ContentItemId::new();
        let err = EngagementError::item_not_found(id);
        assert_eq!(err.to_string(), format!("Content item not found: {}", id));
    }
}
