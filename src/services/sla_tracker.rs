//! Tracker operations: status queries, response/resolution recording, the
//! rolling next-response window, and pause/resume with exact due-date
//! extension. Functions take the calendar they need as an argument; nothing
//! is looked up from ambient state.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::errors::EngineResult;
use crate::models::calendar::BusinessCalendar;
use crate::models::sla::SlaTracker;
use crate::services::deadline::{
    add_business_duration, add_wall_clock_duration, business_minutes_between,
};
use crate::services::pause_ledger;

/// Sentinel remaining-minutes value reported while the clock is suspended:
/// "not counting", not "compliant".
pub const SUSPENDED_REMAINING_MINUTES: i64 = i64::MAX;

#[derive(Debug, Clone, PartialEq)]
pub struct SlaStatusReport {
    pub is_first_response_breached: bool,
    pub is_resolution_breached: bool,
    pub first_response_remaining_minutes: i64,
    pub resolution_remaining_minutes: i64,
    pub first_response_percentage: f64,
    pub resolution_percentage: f64,
}

impl SlaStatusReport {
    fn suspended() -> Self {
        Self {
            is_first_response_breached: false,
            is_resolution_breached: false,
            first_response_remaining_minutes: SUSPENDED_REMAINING_MINUTES,
            resolution_remaining_minutes: SUSPENDED_REMAINING_MINUTES,
            first_response_percentage: 0.0,
            resolution_percentage: 0.0,
        }
    }
}

/// Breach flags, remaining minutes, and percentage consumed as of `now`.
/// A tracker with an open pause reports the frozen form.
pub fn check_status(
    tracker: &SlaTracker,
    calendar: &BusinessCalendar,
    now: DateTime<Utc>,
) -> EngineResult<SlaStatusReport> {
    if pause_ledger::has_open(&tracker.pause_periods) {
        return Ok(SlaStatusReport::suspended());
    }

    let elapsed = effective_elapsed_minutes(tracker, calendar, now)?;

    Ok(SlaStatusReport {
        is_first_response_breached: breached(
            tracker.first_response_met,
            tracker.first_response_due_at,
            now,
        ),
        is_resolution_breached: breached(tracker.resolution_met, tracker.resolution_due_at, now),
        first_response_remaining_minutes: remaining_minutes(tracker.first_response_due_at, now),
        resolution_remaining_minutes: remaining_minutes(tracker.resolution_due_at, now),
        first_response_percentage: clamped_percentage(elapsed, tracker.first_response_hours * 60.0),
        resolution_percentage: clamped_percentage(elapsed, tracker.resolution_hours * 60.0),
    })
}

/// Unclamped share of the resolution budget consumed, for escalation
/// thresholds above 100%. None when the tracker has no resolution budget;
/// 0 while the clock is suspended.
pub fn consumed_resolution_percentage(
    tracker: &SlaTracker,
    calendar: &BusinessCalendar,
    now: DateTime<Utc>,
) -> EngineResult<Option<f64>> {
    let budget_minutes = tracker.resolution_hours * 60.0;
    if budget_minutes <= 0.0 {
        return Ok(None);
    }
    if pause_ledger::has_open(&tracker.pause_periods) {
        return Ok(Some(0.0));
    }
    let elapsed = effective_elapsed_minutes(tracker, calendar, now)?;
    Ok(Some(elapsed / budget_minutes * 100.0))
}

/// Record the first agent response. The first write wins; later calls are
/// no-ops. An agent reply also satisfies a pending next-response window.
pub fn process_first_response(tracker: &mut SlaTracker, now: DateTime<Utc>) {
    if tracker.first_response_met.is_none() {
        let met = now <= tracker.first_response_due_at;
        tracker.first_response_met = Some(met);
        tracker.updated_at = now;
        info!(
            "First response recorded for ticket {} (met: {})",
            tracker.ticket_id, met
        );
    }
    if let (Some(due), None) = (tracker.next_response_due_at, tracker.next_response_met) {
        tracker.next_response_met = Some(now <= due);
        tracker.updated_at = now;
    }
}

/// Record resolution. Same first-write-wins pattern as first response.
pub fn process_resolution(tracker: &mut SlaTracker, now: DateTime<Utc>) {
    if tracker.resolution_met.is_none() {
        let met = now <= tracker.resolution_due_at;
        tracker.resolution_met = Some(met);
        tracker.updated_at = now;
        info!(
            "Resolution recorded for ticket {} (met: {})",
            tracker.ticket_id, met
        );
    }
}

/// Restart the next-response clock from `now` — used whenever the customer
/// supplies new input. No-op for policies without a next-response budget.
pub fn reset_next_response_window(
    tracker: &mut SlaTracker,
    calendar: &BusinessCalendar,
    now: DateTime<Utc>,
) -> EngineResult<()> {
    let hours = match tracker.next_response_hours {
        Some(hours) => hours,
        None => return Ok(()),
    };
    let due = if tracker.business_hours_only {
        add_business_duration(now, hours, calendar)?
    } else {
        add_wall_clock_duration(now, hours)
    };
    tracker.next_response_due_at = Some(due);
    tracker.next_response_met = None;
    tracker.updated_at = now;
    Ok(())
}

/// Suspend the SLA clock. Idempotent: pausing a paused tracker changes
/// nothing. Returns whether a new pause was opened.
pub fn pause(tracker: &mut SlaTracker, now: DateTime<Utc>) -> bool {
    let opened = pause_ledger::open(&mut tracker.pause_periods, now);
    if opened {
        tracker.updated_at = now;
        info!("SLA clock paused for ticket {}", tracker.ticket_id);
    }
    opened
}

/// End the open pause and push every not-yet-met due date forward by the
/// exact duration of the just-ended pause (its business-minute equivalent
/// for business-hours policies), so paused time never counts against the
/// SLA. No open pause is a no-op, never an error. Returns the paused
/// minutes of the ended interval.
pub fn resume(
    tracker: &mut SlaTracker,
    calendar: &BusinessCalendar,
    now: DateTime<Utc>,
) -> EngineResult<Option<f64>> {
    let started_at = match tracker.pause_periods.iter().find(|p| p.is_open()) {
        Some(period) => period.started_at,
        None => return Ok(None),
    };
    let minutes = match pause_ledger::close(&mut tracker.pause_periods, now) {
        Some(minutes) => minutes,
        None => return Ok(None),
    };
    let ended_at = if now > started_at { now } else { started_at };
    extend_unmet_due_dates(tracker, started_at, ended_at, calendar)?;
    tracker.updated_at = now;
    info!(
        "SLA clock resumed for ticket {} after {:.1} paused minutes",
        tracker.ticket_id, minutes
    );
    Ok(Some(minutes))
}

/// Extend every due date whose met flag is still unset by the duration of
/// `[pause_started, pause_ended]`.
pub(crate) fn extend_unmet_due_dates(
    tracker: &mut SlaTracker,
    pause_started: DateTime<Utc>,
    pause_ended: DateTime<Utc>,
    calendar: &BusinessCalendar,
) -> EngineResult<()> {
    if tracker.first_response_met.is_none() {
        tracker.first_response_due_at = extended_due(
            tracker.first_response_due_at,
            pause_started,
            pause_ended,
            tracker.business_hours_only,
            calendar,
        )?;
    }
    if tracker.next_response_met.is_none() {
        if let Some(due) = tracker.next_response_due_at {
            tracker.next_response_due_at = Some(extended_due(
                due,
                pause_started,
                pause_ended,
                tracker.business_hours_only,
                calendar,
            )?);
        }
    }
    if tracker.resolution_met.is_none() {
        tracker.resolution_due_at = extended_due(
            tracker.resolution_due_at,
            pause_started,
            pause_ended,
            tracker.business_hours_only,
            calendar,
        )?;
    }
    Ok(())
}

fn extended_due(
    due: DateTime<Utc>,
    pause_started: DateTime<Utc>,
    pause_ended: DateTime<Utc>,
    business_hours_only: bool,
    calendar: &BusinessCalendar,
) -> EngineResult<DateTime<Utc>> {
    if business_hours_only {
        let minutes = business_minutes_between(pause_started, pause_ended, calendar)?;
        if minutes <= 0.0 {
            return Ok(due);
        }
        add_business_duration(due, minutes / 60.0, calendar)
    } else {
        Ok(due + (pause_ended - pause_started))
    }
}

/// Elapsed SLA-countable minutes since ticket creation: wall minutes minus
/// paused overlap for 24/7 policies, business minutes minus paused
/// business-minute overlap for business-hours policies (the budget is
/// business-denominated, so numerator and denominator stay consistent).
fn effective_elapsed_minutes(
    tracker: &SlaTracker,
    calendar: &BusinessCalendar,
    now: DateTime<Utc>,
) -> EngineResult<f64> {
    let created = tracker.ticket_created_at;
    if now <= created {
        return Ok(0.0);
    }
    if tracker.business_hours_only {
        let gross = business_minutes_between(created, now, calendar)?;
        let mut paused = 0.0;
        for period in &tracker.pause_periods {
            let start = if period.started_at > created {
                period.started_at
            } else {
                created
            };
            let period_end = period.ended_at.unwrap_or(now);
            let end = if period_end < now { period_end } else { now };
            if end > start {
                paused += business_minutes_between(start, end, calendar)?;
            }
        }
        Ok((gross - paused).max(0.0))
    } else {
        let gross = (now - created).num_seconds() as f64 / 60.0;
        let paused = pause_ledger::cumulative_paused_minutes(&tracker.pause_periods, now, created);
        Ok((gross - paused).max(0.0))
    }
}

fn breached(met: Option<bool>, due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match met {
        Some(met) => !met,
        None => now >= due,
    }
}

fn remaining_minutes(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (due - now).num_minutes()
}

fn clamped_percentage(elapsed_minutes: f64, budget_minutes: f64) -> f64 {
    if budget_minutes <= 0.0 {
        return if elapsed_minutes > 0.0 { 100.0 } else { 0.0 };
    }
    (elapsed_minutes / budget_minutes * 100.0).clamp(0.0, 100.0)
}
