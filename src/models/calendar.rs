use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// One contiguous span of working time on a weekday, expressed in minutes
/// from local midnight. Windows never cross midnight; late-night coverage is
/// represented with two windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyWindow {
    pub weekday: Weekday,
    pub start_minute: u32,
    pub end_minute: u32,
}

impl WeeklyWindow {
    pub fn new(weekday: Weekday, start_minute: u32, end_minute: u32) -> Self {
        Self {
            weekday,
            start_minute,
            end_minute,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.end_minute > MINUTES_PER_DAY {
            return Err(format!(
                "Window on {:?} ends at minute {} (past midnight)",
                self.weekday, self.end_minute
            ));
        }
        if self.start_minute >= self.end_minute {
            return Err(format!(
                "Window on {:?} has start {} >= end {}",
                self.weekday, self.start_minute, self.end_minute
            ));
        }
        Ok(())
    }
}

/// Weekly working-hour windows plus full-day holiday exceptions for one
/// organization. Configured by administrators; read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessCalendar {
    pub organization_id: String,
    pub timezone: String, // IANA timezone (e.g., "America/New_York")
    pub windows: Vec<WeeklyWindow>,
    pub holidays: BTreeSet<NaiveDate>,
}

impl BusinessCalendar {
    pub fn new(organization_id: String, timezone: String) -> Self {
        Self {
            organization_id,
            timezone,
            windows: Vec::new(),
            holidays: BTreeSet::new(),
        }
    }

    /// Add a working window from "HH:MM" boundaries.
    pub fn add_window(&mut self, weekday: Weekday, start: &str, end: &str) -> Result<(), String> {
        let window = WeeklyWindow::new(weekday, parse_hhmm(start)?, parse_hhmm(end)?);
        window.validate()?;
        self.windows.push(window);
        Ok(())
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn validate(&self) -> Result<(), String> {
        self.tz()?;
        for window in &self.windows {
            window.validate()?;
        }
        Ok(())
    }

    pub fn has_windows(&self) -> bool {
        !self.windows.is_empty()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn tz(&self) -> Result<Tz, String> {
        self.timezone
            .parse()
            .map_err(|_| format!("Invalid timezone: {}", self.timezone))
    }

    /// Windows on the given weekday, sorted by opening minute.
    pub fn windows_for(&self, weekday: Weekday) -> Vec<WeeklyWindow> {
        let mut windows: Vec<WeeklyWindow> = self
            .windows
            .iter()
            .copied()
            .filter(|w| w.weekday == weekday)
            .collect();
        windows.sort_by_key(|w| w.start_minute);
        windows
    }

    /// Whether the instant falls inside a working window and not on a holiday,
    /// judged in the calendar's local timezone.
    pub fn is_working_instant(&self, at: DateTime<Utc>) -> Result<bool, String> {
        let tz = self.tz()?;
        let local = at.with_timezone(&tz);
        let date = local.date_naive();
        if self.is_holiday(date) {
            return Ok(false);
        }
        let minute = local.hour() * 60 + local.minute();
        Ok(self
            .windows_for(date.weekday())
            .iter()
            .any(|w| minute >= w.start_minute && minute < w.end_minute))
    }
}

/// Parse an "HH:MM" boundary into a minute-of-day. "24:00" is the exclusive
/// end-of-day bound.
pub fn parse_hhmm(value: &str) -> Result<u32, String> {
    let (hours, minutes) = value
        .split_once(':')
        .ok_or_else(|| format!("Invalid time of day: {}", value))?;
    let hours: u32 = hours
        .parse()
        .map_err(|_| format!("Invalid time of day: {}", value))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| format!("Invalid time of day: {}", value))?;
    if hours > 24 || minutes > 59 || (hours == 24 && minutes != 0) {
        return Err(format!("Invalid time of day: {}", value));
    }
    Ok(hours * 60 + minutes)
}
