//! In-memory content store backed by a HashMap.
//!
//! Honors the same conditional-write contract as the Postgres store, so the
//! engines behave identically against both.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::store::{ContentStore, StoreError, Version};
use crate::common::ContentItemId;
use crate::domains::content::ContentItem;

#[derive(Default)]
pub struct InMemoryContentStore {
    data: Mutex<HashMap<ContentItemId, ContentItem>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.data.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a record outright, bypassing the version check.
    ///
    /// Hard deletes never happen through the engines; this stands in for an
    /// external purge when exercising read-time edge filtering.
    pub fn purge(&self, id: ContentItemId) -> Option<ContentItem> {
        self.data.lock().ok().and_then(|mut d| d.remove(&id))
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ContentItemId, ContentItem>>, StoreError> {
        self.data
            .lock()
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn load(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn compare_and_swap(
        &self,
        id: ContentItemId,
        expected: Version,
        record: &ContentItem,
    ) -> Result<Version, StoreError> {
        let mut data = self.lock()?;

        let current = data.get(&id).map(|r| r.version).unwrap_or(Version::NONE);
        if current != expected {
            return Err(StoreError::Conflict);
        }

        let next = expected.next();
        let mut stored = record.clone();
        stored.version = next;
        data.insert(id, stored);
        Ok(next)
    }

    async fn exists(&self, id: ContentItemId) -> Result<bool, StoreError> {
        Ok(self.lock()?.contains_key(&id))
    }
}
