//! Event sink trait and implementations.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, Level};

use super::AuditEvent;

/// Receiver of audit events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Records an event.
    async fn emit(&self, event: AuditEvent);

    /// Records an event without awaiting. Must not panic; failures are
    /// logged and dropped.
    fn try_emit(&self, event: AuditEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: AuditEvent) {}

    fn try_emit(&self, _event: AuditEvent) {}
}

/// Writes events to the tracing log.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a sink logging at `level` (debug or info).
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    fn log_event(&self, event: &AuditEvent) {
        if self.level == Level::DEBUG {
            debug!(
                event_type = %event.event_type,
                project_id = %event.project_id,
                actor = %event.actor,
                data = %event.data,
                "Audit: {}", event.event_type
            );
        } else {
            info!(
                event_type = %event.event_type,
                project_id = %event.project_id,
                actor = %event.actor,
                data = %event.data,
                "Audit: {}", event.event_type
            );
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: AuditEvent) {
        self.log_event(&event);
    }

    fn try_emit(&self, event: AuditEvent) {
        self.log_event(&event);
    }
}

/// Keeps every event in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns the types of collected events, in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    /// Returns events whose type starts with `prefix`.
    #[must_use]
    pub fn events_of_type(&self, prefix: &str) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: AuditEvent) {
        self.events.write().push(event);
    }

    fn try_emit(&self, event: AuditEvent) {
        self.events.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_types;

    fn event(event_type: &str) -> AuditEvent {
        AuditEvent::new(event_type, "p-1", "a-1")
    }

    #[tokio::test]
    async fn test_noop_and_logging_sinks() {
        NoOpEventSink.emit(event(event_types::STAGE_ADVANCED)).await;
        let sink = LoggingEventSink::debug();
        sink.emit(event(event_types::STAGE_LOCKED).with_data(serde_json::json!({"to": "uat"})))
            .await;
        LoggingEventSink::default().try_emit(event(event_types::STAGE_LOCKED));
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(event(event_types::CONTAINER_SUBMITTED)).await;
        sink.try_emit(event(event_types::CONTAINER_APPROVED));
        sink.try_emit(event(event_types::STAGE_ADVANCED));

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.events_of_type("container.").len(), 2);
        assert_eq!(
            sink.event_types(),
            vec![
                "container.submitted".to_string(),
                "container.approved".to_string(),
                "stage.advanced".to_string()
            ]
        );
    }
}
