#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc, Weekday};
use slaguard::models::*;
use slaguard::services::policy_resolver;

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

/// Mon-Fri 09:00-17:00 UTC, no holidays.
pub fn weekday_calendar() -> BusinessCalendar {
    let mut calendar = BusinessCalendar::new("org-001".to_string(), "UTC".to_string());
    for weekday in [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ] {
        calendar.add_window(weekday, "09:00", "17:00").unwrap();
    }
    calendar
}

pub fn empty_calendar() -> BusinessCalendar {
    BusinessCalendar::new("org-001".to_string(), "UTC".to_string())
}

pub fn make_policy(
    first_response_hours: f64,
    next_response_hours: Option<f64>,
    resolution_hours: f64,
    business_hours_only: bool,
) -> SlaPolicy {
    SlaPolicy::new(
        "org-001".to_string(),
        "prio-high".to_string(),
        "High priority".to_string(),
        Some("Budgets for high priority tickets".to_string()),
        first_response_hours,
        next_response_hours,
        resolution_hours,
        business_hours_only,
    )
}

pub fn make_ticket(created_at: DateTime<Utc>) -> TicketRecord {
    let mut ticket = TicketRecord::new("org-001".to_string(), "Open".to_string());
    ticket.priority_id = Some("prio-high".to_string());
    ticket.created_at = created_at;
    ticket
}

/// Ticket + assigned tracker in one step.
pub fn make_tracker(
    created_at: DateTime<Utc>,
    policy: &SlaPolicy,
    calendar: &BusinessCalendar,
) -> SlaTracker {
    let ticket = make_ticket(created_at);
    policy_resolver::assign(&ticket, policy, calendar, None).unwrap()
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} within {} of {}",
        actual,
        tolerance,
        expected
    );
}
