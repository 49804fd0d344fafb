use async_trait::async_trait;
use rolepilot_application::{AuditEvent, AuditRepository};
use rolepilot_core::AppResult;
use tokio::sync::RwLock;
use tracing::debug;

/// Append-only in-memory audit log.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        debug!(
            action = event.action.as_str(),
            resource_id = %event.resource_id,
            "audit event appended"
        );
        self.events.write().await.push(event);
        Ok(())
    }

    async fn list_events(&self) -> AppResult<Vec<AuditEvent>> {
        Ok(self.events.read().await.clone())
    }
}
