// TestDependencies - store and notifier doubles for testing
//
// Wrap the in-memory store to inject conflicts, backend failures and
// interleavings that are impossible to hit deterministically otherwise.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Barrier;

use super::memory_store::InMemoryContentStore;
use super::store::{ContentStore, StoreError, Version};
use super::traits::BaseNotifier;
use crate::common::ContentItemId;
use crate::domains::content::ContentItem;
use crate::domains::events::EngagementEvent;

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// Notifiers
// =============================================================================

/// Records every delivered event.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<EngagementEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngagementEvent> {
        guard(&self.events).clone()
    }

    pub fn clear(&self) {
        guard(&self.events).clear();
    }
}

#[async_trait]
impl BaseNotifier for RecordingNotifier {
    async fn notify(&self, event: &EngagementEvent) -> Result<()> {
        guard(&self.events).push(event.clone());
        Ok(())
    }
}

/// Fails every delivery.
pub struct FailingNotifier;

#[async_trait]
impl BaseNotifier for FailingNotifier {
    async fn notify(&self, _event: &EngagementEvent) -> Result<()> {
        anyhow::bail!("notification channel unavailable")
    }
}

// =============================================================================
// Scripted Store
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct WriteFailure {
    /// Writes that pass through before failures start.
    skip: u32,
    /// Failures left to inject.
    remaining: u32,
}

/// In-memory store with per-item fault injection.
#[derive(Default)]
pub struct ScriptedStore {
    inner: InMemoryContentStore,
    conflicts: Mutex<HashMap<ContentItemId, u32>>,
    write_failures: Mutex<HashMap<ContentItemId, WriteFailure>>,
    failing_loads: Mutex<HashSet<ContentItemId>>,
    commits: AtomicUsize,
    injected_conflicts: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `times` conditional writes to `id` report a conflict
    /// without touching the record.
    pub fn inject_conflicts(&self, id: ContentItemId, times: u32) {
        guard(&self.conflicts).insert(id, times);
    }

    /// Fail the next `times` writes to `id` with a backend error.
    pub fn fail_writes(&self, id: ContentItemId, times: u32) {
        self.fail_writes_after(id, 0, times);
    }

    /// Let `skip` writes to `id` through, then fail the next `times`.
    pub fn fail_writes_after(&self, id: ContentItemId, skip: u32, times: u32) {
        guard(&self.write_failures).insert(
            id,
            WriteFailure {
                skip,
                remaining: times,
            },
        );
    }

    /// Every load of `id` fails with a backend error.
    pub fn fail_loads(&self, id: ContentItemId) {
        guard(&self.failing_loads).insert(id);
    }

    pub fn purge(&self, id: ContentItemId) -> Option<ContentItem> {
        self.inner.purge(id)
    }

    /// Successful conditional writes so far.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn injected_conflicts(&self) -> usize {
        self.injected_conflicts.load(Ordering::SeqCst)
    }

    fn take_conflict(&self, id: ContentItemId) -> bool {
        let mut conflicts = guard(&self.conflicts);
        match conflicts.get_mut(&id) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }

    fn take_write_failure(&self, id: ContentItemId) -> bool {
        let mut failures = guard(&self.write_failures);
        match failures.get_mut(&id) {
            Some(plan) if plan.skip > 0 => {
                plan.skip -= 1;
                false
            }
            Some(plan) if plan.remaining > 0 => {
                plan.remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn load(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError> {
        if guard(&self.failing_loads).contains(&id) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "injected load failure for {}",
                id
            )));
        }
        self.inner.load(id).await
    }

    async fn compare_and_swap(
        &self,
        id: ContentItemId,
        expected: Version,
        record: &ContentItem,
    ) -> Result<Version, StoreError> {
        if self.take_conflict(id) {
            self.injected_conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Conflict);
        }
        if self.take_write_failure(id) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "injected write failure for {}",
                id
            )));
        }
        let version = self.inner.compare_and_swap(id, expected, record).await?;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }
}

// =============================================================================
// Barrier Store
// =============================================================================

/// Holds the first `parties` loads at a barrier so that concurrent
/// operations all read the same version before any of them writes.
pub struct BarrierStore {
    inner: InMemoryContentStore,
    barrier: Barrier,
    gated_loads: AtomicUsize,
    conflicts: AtomicUsize,
}

impl BarrierStore {
    pub fn new(parties: usize) -> Self {
        Self {
            inner: InMemoryContentStore::new(),
            barrier: Barrier::new(parties),
            gated_loads: AtomicUsize::new(parties),
            conflicts: AtomicUsize::new(0),
        }
    }

    /// Conflicts observed on conditional writes.
    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for BarrierStore {
    async fn load(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError> {
        let record = self.inner.load(id).await?;
        let gated = self
            .gated_loads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if gated {
            self.barrier.wait().await;
        }
        Ok(record)
    }

    async fn compare_and_swap(
        &self,
        id: ContentItemId,
        expected: Version,
        record: &ContentItem,
    ) -> Result<Version, StoreError> {
        let result = self.inner.compare_and_swap(id, expected, record).await;
        if matches!(result, Err(StoreError::Conflict)) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}
