mod helpers;

use chrono::{Duration, NaiveDate};
use helpers::*;
use slaguard::domain::errors::EngineError;
use slaguard::models::BusinessCalendar;
use slaguard::services::deadline::{
    add_business_duration, add_wall_clock_duration, business_minutes_between,
};

#[test]
fn test_wall_clock_addition_is_exact() {
    let start = utc(2024, 1, 5, 16, 0);
    assert_eq!(
        add_wall_clock_duration(start, 24.0),
        start + Duration::hours(24)
    );
    assert_eq!(
        add_wall_clock_duration(start, 1.5),
        start + Duration::minutes(90)
    );
    assert_eq!(add_wall_clock_duration(start, 0.0), start);
}

#[test]
fn test_zero_budget_returns_start() {
    let calendar = weekday_calendar();
    let start = utc(2024, 1, 5, 16, 0);
    assert_eq!(add_business_duration(start, 0.0, &calendar).unwrap(), start);
}

#[test]
fn test_no_windows_is_a_configuration_error() {
    let calendar = empty_calendar();
    let start = utc(2024, 1, 5, 16, 0);
    let result = add_business_duration(start, 4.0, &calendar);
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

/// Ticket created Friday 16:00, 4 business hours: one hour Friday, skip the
/// weekend, three hours from Monday's 09:00 open. Due Monday 12:00.
#[test]
fn test_friday_afternoon_spills_into_monday() {
    let calendar = weekday_calendar();
    // 2024-01-05 is a Friday
    let start = utc(2024, 1, 5, 16, 0);
    let due = add_business_duration(start, 4.0, &calendar).unwrap();
    assert_eq!(due, utc(2024, 1, 8, 12, 0));
}

#[test]
fn test_start_outside_windows_waits_for_next_open() {
    let calendar = weekday_calendar();
    // Saturday morning: nothing counts until Monday 09:00
    let start = utc(2024, 1, 6, 10, 0);
    let due = add_business_duration(start, 1.0, &calendar).unwrap();
    assert_eq!(due, utc(2024, 1, 8, 10, 0));

    // Weekday before opening: budget starts at 09:00 the same day
    let early = utc(2024, 1, 8, 6, 30);
    let due = add_business_duration(early, 2.0, &calendar).unwrap();
    assert_eq!(due, utc(2024, 1, 8, 11, 0));
}

#[test]
fn test_partial_consumption_lands_inside_window() {
    let calendar = weekday_calendar();
    let start = utc(2024, 1, 8, 16, 30);
    // 30 minutes Monday, 30 minutes Tuesday morning
    let due = add_business_duration(start, 1.0, &calendar).unwrap();
    assert_eq!(due, utc(2024, 1, 9, 9, 30));
    assert!(calendar.is_working_instant(due - Duration::seconds(1)).unwrap());
}

#[test]
fn test_holiday_is_skipped() {
    let mut calendar = weekday_calendar();
    // Monday 2024-01-08 is a holiday; Friday's overflow lands Tuesday
    calendar.add_holiday(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    let start = utc(2024, 1, 5, 16, 0);
    let due = add_business_duration(start, 4.0, &calendar).unwrap();
    assert_eq!(due, utc(2024, 1, 9, 12, 0));
}

#[test]
fn test_multi_day_budget() {
    let calendar = weekday_calendar();
    // 20 business hours from Monday 09:00: 8h Mon + 8h Tue + 4h Wed
    let start = utc(2024, 1, 8, 9, 0);
    let due = add_business_duration(start, 20.0, &calendar).unwrap();
    assert_eq!(due, utc(2024, 1, 10, 13, 0));
}

#[test]
fn test_due_instant_is_never_in_non_working_time() {
    let calendar = weekday_calendar();
    let start = utc(2024, 1, 5, 14, 17);
    for hours in [0.25, 1.0, 3.5, 7.9, 12.0, 26.75] {
        let due = add_business_duration(start, hours, &calendar).unwrap();
        // The minute being consumed right before the due instant is working
        // time; the budget never spills into evenings, weekends or holidays.
        assert!(
            calendar.is_working_instant(due - Duration::seconds(1)).unwrap(),
            "budget {}h landed at {} outside working time",
            hours,
            due
        );
    }
}

#[test]
fn test_all_holidays_calendar_fails_instead_of_looping() {
    let mut calendar = weekday_calendar();
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for _ in 0..500 {
        calendar.add_holiday(date);
        date = date.succ_opt().unwrap();
    }
    let start = utc(2024, 1, 5, 10, 0);
    let result = add_business_duration(start, 1.0, &calendar);
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

#[test]
fn test_business_minutes_between() {
    let calendar = weekday_calendar();
    // Friday 16:00 -> Monday 10:00: 60 minutes Friday + 60 minutes Monday
    let from = utc(2024, 1, 5, 16, 0);
    let to = utc(2024, 1, 8, 10, 0);
    assert_close(
        business_minutes_between(from, to, &calendar).unwrap(),
        120.0,
        1e-9,
    );

    // A weekend contains no business minutes
    let saturday = utc(2024, 1, 6, 0, 0);
    let sunday = utc(2024, 1, 7, 23, 59);
    assert_close(
        business_minutes_between(saturday, sunday, &calendar).unwrap(),
        0.0,
        1e-9,
    );

    // Reversed bounds yield zero
    assert_close(
        business_minutes_between(to, from, &calendar).unwrap(),
        0.0,
        1e-9,
    );
}

#[test]
fn test_business_minutes_full_week() {
    let calendar = weekday_calendar();
    let from = utc(2024, 1, 8, 0, 0); // Monday
    let to = utc(2024, 1, 14, 23, 59); // Sunday
    assert_close(
        business_minutes_between(from, to, &calendar).unwrap(),
        5.0 * 8.0 * 60.0,
        1e-9,
    );
}

#[test]
fn test_non_utc_timezone_windows() {
    // 09:00-17:00 in New York is 14:00-22:00 UTC during EST
    let mut calendar = BusinessCalendar::new(
        "org-002".to_string(),
        "America/New_York".to_string(),
    );
    calendar
        .add_window(chrono::Weekday::Mon, "09:00", "17:00")
        .unwrap();

    // Monday 2024-01-08 13:00 UTC is 08:00 local: waits for 09:00 local
    let start = utc(2024, 1, 8, 13, 0);
    let due = add_business_duration(start, 1.0, &calendar).unwrap();
    assert_eq!(due, utc(2024, 1, 8, 15, 0));
}
