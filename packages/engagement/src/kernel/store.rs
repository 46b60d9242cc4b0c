//! Whole-record persistence for content items.
//!
//! # The Contract
//!
//! 1. **Load returns the record with its version.** The version lives on the
//!    record itself (`ContentItem::version`) and always equals the stored one.
//!
//! 2. **Writes are conditional.** `compare_and_swap` only replaces the record
//!    when the stored version still equals `expected`. Writing with
//!    [`Version::NONE`] creates the record and conflicts if it already exists.
//!
//! 3. **No field-level updates.** Every write replaces the whole record, so
//!    the version check is the only serialization point.
//!
//! There is no multi-record transaction. Anything that touches two items
//! issues two independent conditional writes.

use async_trait::async_trait;

use crate::common::ContentItemId;
use crate::domains::content::ContentItem;

// =============================================================================
// Store Error
// =============================================================================

/// Errors from content item storage.
///
/// - [`StoreError::Conflict`] means another writer committed first. The
///   caller reloads and recomputes.
/// - [`StoreError::Backend`] means storage itself failed (connection,
///   serialization). It is never retried as a conflict.
#[derive(Debug)]
pub enum StoreError {
    Conflict,
    Backend(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Conflict => write!(f, "version conflict: record was modified concurrently"),
            StoreError::Backend(e) => write!(f, "storage backend error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Conflict => None,
            StoreError::Backend(e) => Some(e.as_ref()),
        }
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Backend(err)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

// =============================================================================
// Version
// =============================================================================

/// Monotonic version token for optimistic concurrency.
///
/// [`Version::NONE`] marks a record that has never been written. Every
/// committed write advances the version by one.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    pub const NONE: Version = Version(0);

    pub fn new(value: u64) -> Self {
        Version(value)
    }

    pub fn next(self) -> Self {
        Version(self.0.saturating_add(1))
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NONE")
        } else {
            write!(f, "v{}", self.0)
        }
    }
}

// =============================================================================
// Content Store
// =============================================================================

#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    /// Load a content item. `None` if it was never written.
    async fn load(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError>;

    /// Replace the record if its stored version equals `expected`.
    ///
    /// The stored copy gets version `expected.next()`, which is returned.
    async fn compare_and_swap(
        &self,
        id: ContentItemId,
        expected: Version,
        record: &ContentItem,
    ) -> Result<Version, StoreError>;

    async fn exists(&self, id: ContentItemId) -> Result<bool, StoreError> {
        Ok(self.load(id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_advances_by_one() {
        assert!(Version::NONE.is_none());
        assert_eq!(Version::NONE.next(), Version::new(1));
        assert_eq!(Version::new(41).next().value(), 42);
    }

    #[test]
    fn version_display() {
        assert_eq!(Version::NONE.to_string(), "NONE");
        assert_eq!(Version::new(5).to_string(), "v5");
    }

    #[test]
    fn store_error_display() {
        assert!(StoreError::Conflict.to_string().contains("conflict"));
        let backend = StoreError::Backend(anyhow::anyhow!("connection refused"));
        assert!(backend.to_string().contains("connection refused"));
    }
}
