//! The dispatch seam.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::NotificationRecord;

/// Delivery failure reported by a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The downstream channel refused the record.
    #[error("notification rejected: {0}")]
    Rejected(String),

    /// The downstream channel could not be reached.
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification delivery.
///
/// Implementations may receive the same record more than once and should
/// use [`NotificationRecord::id`] to drop duplicates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Delivers one record.
    async fn dispatch(&self, record: &NotificationRecord) -> Result<(), DispatchError>;
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDispatcher;

#[async_trait]
impl NotificationDispatcher for NoOpDispatcher {
    async fn dispatch(&self, _record: &NotificationRecord) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// Writes every record to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn dispatch(&self, record: &NotificationRecord) -> Result<(), DispatchError> {
        info!(
            notification_id = %record.id,
            project_id = %record.project_id,
            kind = %record.kind,
            audience = %record.audience,
            recipients = record.recipients.len(),
            "Notification: {}", record.title
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Party;
    use crate::notifications::NotificationKind;
    use crate::utils::now_utc;

    fn record() -> NotificationRecord {
        NotificationRecord {
            id: "ntf:1".to_string(),
            project_id: "p-1".to_string(),
            kind: NotificationKind::GoLiveTriggered,
            audience: Party::Client,
            recipients: vec!["c-1".to_string()],
            title: "Live".to_string(),
            message: "You are live".to_string(),
            link_url: "/x".to_string(),
            created_at: now_utc(),
        }
    }

    #[tokio::test]
    async fn test_builtin_dispatchers_accept() {
        assert!(NoOpDispatcher.dispatch(&record()).await.is_ok());
        assert!(LoggingDispatcher.dispatch(&record()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_dispatcher() {
        let mut mock = MockNotificationDispatcher::new();
        mock.expect_dispatch()
            .times(1)
            .returning(|_| Err(DispatchError::Unavailable("smtp down".to_string())));
        let err = mock.dispatch(&record()).await.unwrap_err();
        assert_eq!(err.to_string(), "notification channel unavailable: smtp down");
    }
}
