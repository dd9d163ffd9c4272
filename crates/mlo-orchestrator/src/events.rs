//! # Notification & Event Boundaries
//!
//! Two fire-and-forget outputs the orchestrator emits through:
//!
//! - [`NotificationSink`] — user-visible notifications; delivery
//!   guarantees belong to the sink.
//! - [`EventPublisher`] — status-change events onto a message channel,
//!   at-least-once, ordered per loan via a loan-id partition key.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mlo_core::{LoanId, TenantId};

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Notification severity, mirroring what the delivery channels render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget notification delivery.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, tenant_id: TenantId, loan_id: LoanId, kind: NotificationKind, message: &str);
}

/// Recording sink for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryNotificationSink {
    sent: Mutex<Vec<(LoanId, NotificationKind, String)>>,
}

impl MemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, in order.
    pub fn sent(&self) -> Vec<(LoanId, NotificationKind, String)> {
        self.sent.lock().clone()
    }
}

impl NotificationSink for MemoryNotificationSink {
    fn notify(&self, _tenant_id: TenantId, loan_id: LoanId, kind: NotificationKind, message: &str) {
        tracing::debug!(%loan_id, %kind, message, "notification");
        self.sent.lock().push((loan_id, kind, message.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Event publishing
// ---------------------------------------------------------------------------

/// A published status-change event, as the channel sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedEvent {
    pub topic: String,
    /// Partition key — the loan id, so per-loan ordering holds even
    /// though cross-loan ordering is not guaranteed.
    pub partition_key: String,
    pub payload: Value,
}

/// At-least-once event publishing, partitioned by key.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, partition_key: &str, payload: Value);
}

/// Recording publisher for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryEventPublisher {
    events: Mutex<Vec<PublishedEvent>>,
}

impl MemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order.
    pub fn events(&self) -> Vec<PublishedEvent> {
        self.events.lock().clone()
    }
}

impl EventPublisher for MemoryEventPublisher {
    fn publish(&self, topic: &str, partition_key: &str, payload: Value) {
        self.events.lock().push(PublishedEvent {
            topic: topic.to_string(),
            partition_key: partition_key.to_string(),
            payload,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notifications_record_in_order() {
        let sink = MemoryNotificationSink::new();
        let tenant = TenantId::new();
        let loan = LoanId::new();
        sink.notify(tenant, loan, NotificationKind::Info, "processing started");
        sink.notify(tenant, loan, NotificationKind::Error, "credit check failed");

        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, NotificationKind::Info);
        assert_eq!(sent[1].2, "credit check failed");
    }

    #[test]
    fn published_events_carry_partition_key() {
        let publisher = MemoryEventPublisher::new();
        let loan = LoanId::new();
        publisher.publish(
            "loan_state_changes",
            &loan.to_string(),
            json!({"status": "processing"}),
        );
        let events = publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic, "loan_state_changes");
        assert_eq!(events[0].partition_key, loan.to_string());
    }
}
