//! Engagement dependencies (using traits for testability)
//!
//! Every action takes an `EngagementDeps`: the content store, the notifier,
//! and the write policy. There is no other shared state.

use std::sync::Arc;

use tracing::warn;

use super::store::ContentStore;
use super::traits::{BaseNotifier, NoopNotifier};
use crate::domains::events::EngagementEvent;

/// Bounds for optimistic writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePolicy {
    /// Attempts per conditional write before `Contention`, and rounds per
    /// two-record write before `PartialFailure` surfaces.
    pub max_attempts: u32,
}

impl WritePolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

#[derive(Clone)]
pub struct EngagementDeps {
    pub store: Arc<dyn ContentStore>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub policy: WritePolicy,
}

impl EngagementDeps {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            notifier: Arc::new(NoopNotifier),
            policy: WritePolicy::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn BaseNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fire-and-forget delivery of a committed change.
    pub async fn notify(&self, event: EngagementEvent) {
        if let Err(e) = self.notifier.notify(&event).await {
            warn!(
                item_id = %event.item_id(),
                error = %e,
                event = ?event,
                "notification delivery failed"
            );
        }
    }
}
