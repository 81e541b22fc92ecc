use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::services::escalation::{EscalationAction, EscalationLevel};

/// Engine outputs handed to external collaborators (notification dispatch,
/// audit). The engine never formats or delivers messages.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    SlaAssigned {
        ticket_id: String,
        sla_policy_id: String,
        first_response_due_at: DateTime<Utc>,
        resolution_due_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    SlaPaused {
        ticket_id: String,
        paused_at: DateTime<Utc>,
    },
    SlaResumed {
        ticket_id: String,
        paused_minutes: f64,
        resumed_at: DateTime<Utc>,
    },
    SlaCompleted {
        ticket_id: String,
        met: bool,
        resolved_at: DateTime<Utc>,
    },
    SlaEscalated {
        ticket_id: String,
        level: EscalationLevel,
        percentage: f64,
        actions: Vec<EscalationAction>,
        timestamp: DateTime<Utc>,
    },
}

/// Event bus for publishing and subscribing to engine events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SystemEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers (non-blocking, fire-and-forget)
    pub fn publish(&self, event: SystemEvent) {
        // Fire-and-forget - if no subscribers or channel full, just log and continue
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(
                "Failed to publish event (no subscribers or channel full): {}",
                e
            );
        }
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<SystemEvent> {
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000) // Default capacity of 1000 events
    }
}
