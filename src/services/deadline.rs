//! Deadline arithmetic: plain wall-clock addition for 24/7 policies, and a
//! calendar walk that consumes only working minutes for business-hours
//! policies. All instants are UTC; the calendar's timezone is applied only
//! while reasoning about local days and windows.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::errors::{EngineError, EngineResult};
use crate::models::calendar::{BusinessCalendar, MINUTES_PER_DAY};

/// Consecutive days without any consumable working time before the calendar
/// is considered unworkable. Covers any annual holiday layout.
const MAX_IDLE_DAYS: u32 = 400;

/// Ordinary instant arithmetic, used when a policy is not business-hours-only.
pub fn add_wall_clock_duration(start: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    start + Duration::seconds(hours_to_seconds(hours))
}

/// Walk forward from `start`, consuming only minutes inside a weekly window
/// and not on a holiday, until the budget is exhausted. A start outside any
/// window waits for the next open; partial last-window consumption lands
/// exactly inside the window.
pub fn add_business_duration(
    start: DateTime<Utc>,
    hours: f64,
    calendar: &BusinessCalendar,
) -> EngineResult<DateTime<Utc>> {
    if !calendar.has_windows() {
        return Err(EngineError::Configuration(format!(
            "Business-hours calculation requested but calendar for organization {} has no working windows",
            calendar.organization_id
        )));
    }
    calendar.validate().map_err(EngineError::Configuration)?;
    let tz = calendar.tz().map_err(EngineError::Configuration)?;

    let mut budget_seconds = hours_to_seconds(hours);
    if budget_seconds <= 0 {
        return Ok(start);
    }

    let mut cursor = start;
    let mut date = cursor.with_timezone(&tz).date_naive();
    let mut idle_days = 0u32;

    loop {
        let mut consumed_today = false;
        if !calendar.is_holiday(date) {
            for window in calendar.windows_for(date.weekday()) {
                let open = match local_bound(&tz, date, window.start_minute) {
                    Some(at) => at,
                    None => continue, // window open falls in a DST gap
                };
                let close = match local_bound(&tz, date, window.end_minute) {
                    Some(at) => at,
                    None => continue,
                };
                if close <= cursor {
                    continue;
                }
                let from = if cursor > open { cursor } else { open };
                let available = (close - from).num_seconds();
                if available <= 0 {
                    continue;
                }
                if available >= budget_seconds {
                    return Ok(from + Duration::seconds(budget_seconds));
                }
                budget_seconds -= available;
                cursor = close;
                consumed_today = true;
            }
        }

        if consumed_today {
            idle_days = 0;
        } else {
            idle_days += 1;
            if idle_days > MAX_IDLE_DAYS {
                return Err(EngineError::Configuration(format!(
                    "No working time found in {} consecutive days for organization {}",
                    MAX_IDLE_DAYS, calendar.organization_id
                )));
            }
        }

        date = date
            .succ_opt()
            .ok_or_else(|| EngineError::Internal("Calendar date overflow".to_string()))?;
        if let Some(day_start) = local_bound(&tz, date, 0) {
            if day_start > cursor {
                cursor = day_start;
            }
        }
    }
}

/// Business minutes contained in `[from, to]`: the sum of overlaps with every
/// working window, skipping holidays. `to <= from` yields 0.
pub fn business_minutes_between(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    calendar: &BusinessCalendar,
) -> EngineResult<f64> {
    if to <= from {
        return Ok(0.0);
    }
    if !calendar.has_windows() {
        return Err(EngineError::Configuration(format!(
            "Business-minutes query requested but calendar for organization {} has no working windows",
            calendar.organization_id
        )));
    }
    let tz = calendar.tz().map_err(EngineError::Configuration)?;

    let mut total_seconds: i64 = 0;
    let mut date = from.with_timezone(&tz).date_naive();
    let end_date = to.with_timezone(&tz).date_naive();

    while date <= end_date {
        if !calendar.is_holiday(date) {
            for window in calendar.windows_for(date.weekday()) {
                let open = match local_bound(&tz, date, window.start_minute) {
                    Some(at) => at,
                    None => continue,
                };
                let close = match local_bound(&tz, date, window.end_minute) {
                    Some(at) => at,
                    None => continue,
                };
                let overlap_start = if from > open { from } else { open };
                let overlap_end = if to < close { to } else { close };
                if overlap_end > overlap_start {
                    total_seconds += (overlap_end - overlap_start).num_seconds();
                }
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(total_seconds as f64 / 60.0)
}

fn hours_to_seconds(hours: f64) -> i64 {
    (hours * 3600.0).round() as i64
}

/// Local (date, minute-of-day) to a UTC instant. Minute 1440 is the next
/// day's midnight. Returns None when the local time does not exist (DST gap).
fn local_bound(tz: &Tz, date: NaiveDate, minute: u32) -> Option<DateTime<Utc>> {
    let (date, minute) = if minute >= MINUTES_PER_DAY {
        (date.succ_opt()?, minute - MINUTES_PER_DAY)
    } else {
        (date, minute)
    };
    let time = NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0)?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|at| at.with_timezone(&Utc))
}
