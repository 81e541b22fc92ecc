//! Escalation over the share of the resolution budget consumed. Levels are
//! re-evaluated on every scan; only the highest matching level's action set
//! fires. Per-item failures are logged and counted, never abort the batch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::events::{EventBus, SystemEvent};
use crate::models::calendar::BusinessCalendar;
use crate::models::sla::SlaTracker;
use crate::services::sla_tracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationLevel {
    None,
    Level1,
    Level2,
    Level3,
    Level4,
}

impl EscalationLevel {
    /// Highest threshold reached by the (unclamped) percentage consumed.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 120.0 {
            EscalationLevel::Level4
        } else if percentage >= 100.0 {
            EscalationLevel::Level3
        } else if percentage >= 90.0 {
            EscalationLevel::Level2
        } else if percentage >= 75.0 {
            EscalationLevel::Level1
        } else {
            EscalationLevel::None
        }
    }

    /// The full action set for this level. Only this set fires; lower levels
    /// do not accumulate on top of it.
    pub fn actions(&self) -> &'static [EscalationAction] {
        use EscalationAction::*;
        match self {
            EscalationLevel::None => &[],
            EscalationLevel::Level1 => &[NotifyAgent],
            EscalationLevel::Level2 => &[NotifyAgent, NotifyManager],
            EscalationLevel::Level3 => &[NotifyAgent, NotifyManager, FlagForReassignment],
            EscalationLevel::Level4 => &[
                NotifyAgent,
                NotifyManager,
                FlagForReassignment,
                IncreasePriority,
            ],
        }
    }

    pub fn as_number(&self) -> u8 {
        match self {
            EscalationLevel::None => 0,
            EscalationLevel::Level1 => 1,
            EscalationLevel::Level2 => 2,
            EscalationLevel::Level3 => 3,
            EscalationLevel::Level4 => 4,
        }
    }
}

impl std::fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level_{}", self.as_number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationAction {
    NotifyAgent,
    NotifyManager,
    FlagForReassignment,
    IncreasePriority,
}

impl std::fmt::Display for EscalationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EscalationAction::NotifyAgent => write!(f, "notify_agent"),
            EscalationAction::NotifyManager => write!(f, "notify_manager"),
            EscalationAction::FlagForReassignment => write!(f, "flag_for_reassignment"),
            EscalationAction::IncreasePriority => write!(f, "increase_priority"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub processed: usize,
    pub escalated: usize,
    pub errors: usize,
}

/// Scans batches of unresolved trackers and emits escalation events for any
/// level >= 1. Percentages are time-dependent, so computed values live in a
/// short-TTL cache (0 disables caching).
pub struct EscalationEngine {
    event_bus: Option<Arc<EventBus>>,
    cache_ttl: Duration,
    percentage_cache: Mutex<HashMap<String, (DateTime<Utc>, f64)>>,
}

impl EscalationEngine {
    pub fn new(event_bus: Option<Arc<EventBus>>, cache_ttl_secs: i64) -> Self {
        Self {
            event_bus,
            cache_ttl: Duration::seconds(cache_ttl_secs.max(0)),
            percentage_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Iterate up to `batch_limit` trackers, determine each one's level, and
    /// emit the highest matching level's action set. Trackers whose
    /// percentage cannot be computed (no resolution budget) are skipped and
    /// counted as neither escalated nor errored.
    pub async fn scan<'a, I>(
        &self,
        items: I,
        now: DateTime<Utc>,
        batch_limit: usize,
    ) -> ScanOutcome
    where
        I: IntoIterator<Item = (&'a SlaTracker, &'a BusinessCalendar)>,
    {
        let mut outcome = ScanOutcome::default();

        for (tracker, calendar) in items.into_iter().take(batch_limit) {
            if tracker.is_resolved() {
                continue;
            }

            let percentage = match self.percentage_for(tracker, calendar, now) {
                Ok(Some(percentage)) => percentage,
                Ok(None) => continue,
                Err(e) => {
                    error!(
                        "SLA percentage computation failed for ticket {}: {}",
                        tracker.ticket_id, e
                    );
                    outcome.errors += 1;
                    continue;
                }
            };

            outcome.processed += 1;

            let level = EscalationLevel::from_percentage(percentage);
            if level > EscalationLevel::None {
                outcome.escalated += 1;
                info!(
                    "Ticket {} escalated to {} at {:.1}% of resolution budget",
                    tracker.ticket_id, level, percentage
                );
                self.publish(SystemEvent::SlaEscalated {
                    ticket_id: tracker.ticket_id.clone(),
                    level,
                    percentage,
                    actions: level.actions().to_vec(),
                    timestamp: now,
                });
            }

            // Long batches stay preemptible; the caller enforces any overall
            // deadline around the scan.
            tokio::task::yield_now().await;
        }

        outcome
    }

    fn percentage_for(
        &self,
        tracker: &SlaTracker,
        calendar: &BusinessCalendar,
        now: DateTime<Utc>,
    ) -> crate::domain::errors::EngineResult<Option<f64>> {
        if self.cache_ttl > Duration::zero() {
            if let Ok(cache) = self.percentage_cache.lock() {
                if let Some((computed_at, percentage)) = cache.get(&tracker.ticket_id) {
                    if now >= *computed_at && now - *computed_at < self.cache_ttl {
                        return Ok(Some(*percentage));
                    }
                }
            }
        }

        let percentage = sla_tracker::consumed_resolution_percentage(tracker, calendar, now)?;

        if self.cache_ttl > Duration::zero() {
            if let Some(percentage) = percentage {
                if let Ok(mut cache) = self.percentage_cache.lock() {
                    cache.insert(tracker.ticket_id.clone(), (now, percentage));
                }
            }
        }

        Ok(percentage)
    }

    fn publish(&self, event: SystemEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
