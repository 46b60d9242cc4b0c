// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::events::EngagementEvent;

// =============================================================================
// Notification Trait (Infrastructure)
// =============================================================================

/// Outbound notification collaborator.
///
/// Invoked at most once per committed state change, never for no-ops.
/// Failures are logged by the caller and never roll back the mutation.
#[async_trait]
pub trait BaseNotifier: Send + Sync {
    async fn notify(&self, event: &EngagementEvent) -> Result<()>;
}

/// Notifier that drops every event.
pub struct NoopNotifier;

#[async_trait]
impl BaseNotifier for NoopNotifier {
    async fn notify(&self, _event: &EngagementEvent) -> Result<()> {
        Ok(())
    }
}
