//! Pause ledger accounting over a tracker's ordered `PausePeriod` list.
//! Opening an already-open ledger and closing an already-closed one are
//! total no-ops so the surrounding state machine never faults.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::sla::PausePeriod;

pub fn has_open(periods: &[PausePeriod]) -> bool {
    periods.iter().any(|p| p.is_open())
}

/// Append an open period unless one is already open. Returns whether a new
/// period was started (idempotent pause).
pub fn open(periods: &mut Vec<PausePeriod>, at: DateTime<Utc>) -> bool {
    if has_open(periods) {
        debug!("Pause requested on an already-paused ledger; ignoring");
        return false;
    }
    periods.push(PausePeriod::open(at));
    true
}

/// Terminate the open period, clamping the end to its start. Returns the
/// minutes of the just-ended interval, or None when nothing was open.
pub fn close(periods: &mut [PausePeriod], at: DateTime<Utc>) -> Option<f64> {
    let period = periods.iter_mut().find(|p| p.is_open())?;
    let ended_at = if at > period.started_at {
        at
    } else {
        period.started_at
    };
    period.ended_at = Some(ended_at);
    Some((ended_at - period.started_at).num_seconds() as f64 / 60.0)
}

/// Sum of per-period overlap with `[not_before, as_of]` in minutes. An open
/// period contributes up to `as_of`. Never negative.
pub fn cumulative_paused_minutes(
    periods: &[PausePeriod],
    as_of: DateTime<Utc>,
    not_before: DateTime<Utc>,
) -> f64 {
    let mut total_seconds: i64 = 0;
    for period in periods {
        let start = if period.started_at > not_before {
            period.started_at
        } else {
            not_before
        };
        let period_end = period.ended_at.unwrap_or(as_of);
        let end = if period_end < as_of { period_end } else { as_of };
        if end > start {
            total_seconds += (end - start).num_seconds();
        }
    }
    total_seconds as f64 / 60.0
}

/// Structural invariants: ends never precede starts, starts are
/// chronological, and at most one period is open — the last one.
pub fn validate_periods(periods: &[PausePeriod]) -> Result<(), String> {
    let mut previous_start: Option<DateTime<Utc>> = None;
    for (index, period) in periods.iter().enumerate() {
        if let Some(ended_at) = period.ended_at {
            if ended_at < period.started_at {
                return Err("Pause period ends before it starts".to_string());
            }
        } else if index != periods.len() - 1 {
            return Err("Only the last pause period may be open".to_string());
        }
        if let Some(previous) = previous_start {
            if period.started_at < previous {
                return Err("Pause periods are not in chronological order".to_string());
            }
        }
        previous_start = Some(period.started_at);
    }
    Ok(())
}

/// Decode the canonical JSON array, validating shape and invariants —
/// persisted blobs are never trusted.
pub fn periods_from_json(raw: &str) -> Result<Vec<PausePeriod>, String> {
    let periods: Vec<PausePeriod> =
        serde_json::from_str(raw).map_err(|e| format!("Invalid pause period list: {}", e))?;
    validate_periods(&periods)?;
    Ok(periods)
}

pub fn periods_to_json(periods: &[PausePeriod]) -> Result<String, String> {
    serde_json::to_string(periods).map_err(|e| format!("Failed to encode pause periods: {}", e))
}
