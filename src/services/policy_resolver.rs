//! Policy lookup for a ticket's (organization, priority) pair and tracker
//! assignment. Resolution works over plain policy slices handed in by the
//! caller; a missing policy means "no SLA applies", never an error.

use tracing::info;

use crate::domain::errors::EngineResult;
use crate::models::calendar::BusinessCalendar;
use crate::models::sla::{SlaPolicy, SlaTracker};
use crate::models::ticket::{Priority, TicketRecord};
use crate::services::deadline::{add_business_duration, add_wall_clock_duration};
use crate::services::sla_tracker::extend_unmet_due_dates;

/// Exact (organization, priority) match first; otherwise the first policy of
/// the organization whose name or description mentions the priority's name.
pub fn resolve<'a>(
    policies: &'a [SlaPolicy],
    organization_id: &str,
    priority: &Priority,
) -> Option<&'a SlaPolicy> {
    if let Some(exact) = policies
        .iter()
        .find(|p| p.organization_id == organization_id && p.priority_id == priority.id)
    {
        return Some(exact);
    }

    let needle = priority.name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    policies.iter().find(|p| {
        p.organization_id == organization_id
            && (p.name.to_lowercase().contains(&needle)
                || p
                    .description
                    .as_deref()
                    .map(|d| d.to_lowercase().contains(&needle))
                    .unwrap_or(false))
    })
}

/// At most one policy may exist per (organization, priority). Used by the
/// administrative create/update path before persisting.
pub fn find_duplicate_policy<'a>(
    policies: &'a [SlaPolicy],
    organization_id: &str,
    priority_id: &str,
    exclude_policy_id: Option<&str>,
) -> Option<&'a SlaPolicy> {
    policies.iter().find(|p| {
        p.organization_id == organization_id
            && p.priority_id == priority_id
            && exclude_policy_id != Some(p.id.as_str())
    })
}

/// Create (or overwrite) the ticket's tracker from a resolved policy. Due
/// dates are always computed from the ticket's creation instant — also on
/// reassignment after a priority change — so elapsed SLA time is never
/// silently forgiven. All met flags reset to unset. An existing tracker's
/// pause ledger is carried forward, and each already-closed pause re-extends
/// the recomputed due dates exactly as a live resume would have.
pub fn assign(
    ticket: &TicketRecord,
    policy: &SlaPolicy,
    calendar: &BusinessCalendar,
    existing: Option<&SlaTracker>,
) -> EngineResult<SlaTracker> {
    let start = ticket.created_at;

    let first_response_due_at = due_from(start, policy.first_response_hours, policy, calendar)?;
    let next_response_due_at = match policy.next_response_hours {
        Some(hours) => Some(due_from(start, hours, policy, calendar)?),
        None => None,
    };
    let resolution_due_at = due_from(start, policy.resolution_hours, policy, calendar)?;

    let mut tracker = SlaTracker::new(
        ticket,
        policy,
        first_response_due_at,
        next_response_due_at,
        resolution_due_at,
    );

    if let Some(previous) = existing {
        tracker.pause_periods = previous.pause_periods.clone();
        for period in &previous.pause_periods {
            if let Some(ended_at) = period.ended_at {
                extend_unmet_due_dates(&mut tracker, period.started_at, ended_at, calendar)?;
            }
        }
    }

    info!(
        "Assigned SLA policy {} to ticket {} (first_response: {}, resolution: {})",
        policy.id, ticket.id, tracker.first_response_due_at, tracker.resolution_due_at
    );

    Ok(tracker)
}

fn due_from(
    start: chrono::DateTime<chrono::Utc>,
    hours: f64,
    policy: &SlaPolicy,
    calendar: &BusinessCalendar,
) -> EngineResult<chrono::DateTime<chrono::Utc>> {
    if policy.business_hours_only {
        add_business_duration(start, hours, calendar)
    } else {
        Ok(add_wall_clock_duration(start, hours))
    }
}
