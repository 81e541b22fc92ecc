//! Status-name classification and the pause/resume/complete decision for a
//! status change. Status strings are parsed once at the boundary into the
//! tagged category; the rest of the engine never re-reads the raw name.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::errors::EngineResult;
use crate::events::{EventBus, SystemEvent};
use crate::models::calendar::BusinessCalendar;
use crate::models::sla::SlaTracker;
use crate::services::sla_tracker;

const PENDING_KEYWORDS: &[&str] = &[
    "pending",
    "awaiting",
    "waiting",
    "on hold",
    "customer response",
    "suspended",
    "deferred",
];

const IN_PROGRESS_KEYWORDS: &[&str] = &[
    "open",
    "in progress",
    "active",
    "assigned",
    "processing",
    "responded",
];

const RESOLVED_KEYWORDS: &[&str] = &["resolved", "closed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Pending,
    InProgress,
    Resolved,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaTransition {
    Pause,
    Resume,
    Complete,
    None,
}

/// Case-insensitive keyword classification of a status name. In-progress
/// keywords are overridden by a resolved/closed mention in the same name.
pub fn classify(status_name: &str) -> StatusCategory {
    let name = status_name.to_lowercase();
    if PENDING_KEYWORDS.iter().any(|k| name.contains(k)) {
        return StatusCategory::Pending;
    }
    let resolved = RESOLVED_KEYWORDS.iter().any(|k| name.contains(k));
    if !resolved && IN_PROGRESS_KEYWORDS.iter().any(|k| name.contains(k)) {
        return StatusCategory::InProgress;
    }
    if resolved {
        return StatusCategory::Resolved;
    }
    StatusCategory::Other
}

/// What a status change means for the SLA clock. At most one transition
/// fires; on ambiguous data the evaluation order gives Pause priority over
/// Resume over Complete.
pub fn decide_transition(old: StatusCategory, new: StatusCategory) -> SlaTransition {
    if new == StatusCategory::Pending && old != StatusCategory::Pending {
        return SlaTransition::Pause;
    }
    if new == StatusCategory::InProgress && old == StatusCategory::Pending {
        return SlaTransition::Resume;
    }
    if new == StatusCategory::Resolved && old != StatusCategory::Resolved {
        return SlaTransition::Complete;
    }
    SlaTransition::None
}

/// Context for a ticket status change, as reported by the caller.
#[derive(Debug, Clone)]
pub struct SlaTransitionContext {
    pub ticket_id: String,
    pub old_status: String,
    pub new_status: String,
}

/// Classify a status change, apply the decided transition to the tracker,
/// and publish the matching event. Tickets without a tracker tolerate every
/// transition (no SLA applies).
pub fn execute_sla_transition(
    context: &SlaTransitionContext,
    tracker: Option<&mut SlaTracker>,
    calendar: &BusinessCalendar,
    now: DateTime<Utc>,
    event_bus: Option<&EventBus>,
) -> EngineResult<SlaTransition> {
    let decision = decide_transition(classify(&context.old_status), classify(&context.new_status));

    let tracker = match tracker {
        Some(tracker) => tracker,
        None => {
            debug!(
                "Status change for ticket {} without an SLA tracker; nothing to do",
                context.ticket_id
            );
            return Ok(decision);
        }
    };

    match decision {
        SlaTransition::Pause => {
            if sla_tracker::pause(tracker, now) {
                publish(
                    event_bus,
                    SystemEvent::SlaPaused {
                        ticket_id: tracker.ticket_id.clone(),
                        paused_at: now,
                    },
                );
            }
        }
        SlaTransition::Resume => {
            if let Some(paused_minutes) = sla_tracker::resume(tracker, calendar, now)? {
                publish(
                    event_bus,
                    SystemEvent::SlaResumed {
                        ticket_id: tracker.ticket_id.clone(),
                        paused_minutes,
                        resumed_at: now,
                    },
                );
            }
        }
        SlaTransition::Complete => {
            sla_tracker::process_resolution(tracker, now);
            if let Some(met) = tracker.resolution_met {
                publish(
                    event_bus,
                    SystemEvent::SlaCompleted {
                        ticket_id: tracker.ticket_id.clone(),
                        met,
                        resolved_at: now,
                    },
                );
            }
        }
        SlaTransition::None => {}
    }

    Ok(decision)
}

fn publish(event_bus: Option<&EventBus>, event: SystemEvent) {
    if let Some(bus) = event_bus {
        bus.publish(event);
    }
}
