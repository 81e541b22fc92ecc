use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ticket::TicketRecord;

// ===== SLA Policy =====

/// Time budgets for one (organization, priority) pair. Budgets are hours;
/// `business_hours_only` selects calendar-aware deadline arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaPolicy {
    pub id: String,
    pub organization_id: String,
    pub priority_id: String,
    pub name: String,
    pub description: Option<String>,
    pub first_response_hours: f64,
    pub next_response_hours: Option<f64>,
    pub resolution_hours: f64,
    pub business_hours_only: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SlaPolicy {
    pub fn new(
        organization_id: String,
        priority_id: String,
        name: String,
        description: Option<String>,
        first_response_hours: f64,
        next_response_hours: Option<f64>,
        resolution_hours: f64,
        business_hours_only: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id,
            priority_id,
            name,
            description,
            first_response_hours,
            next_response_hours,
            resolution_hours,
            business_hours_only,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (label, hours) in [
            ("first_response_hours", Some(self.first_response_hours)),
            ("next_response_hours", self.next_response_hours),
            ("resolution_hours", Some(self.resolution_hours)),
        ] {
            if let Some(hours) = hours {
                if !hours.is_finite() || hours < 0.0 {
                    return Err(format!("{} must be a non-negative number", label));
                }
            }
        }
        Ok(())
    }
}

// ===== Pause Period =====

/// One interval during which a ticket's SLA clock was suspended. The
/// canonical JSON shape is `{"startedAt": ..., "endedAt": ...}` with RFC-3339
/// timestamps; `endedAt` is absent while the pause is open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PausePeriod {
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl PausePeriod {
    pub fn open(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ended_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

// ===== SLA Tracker =====

/// Per-ticket SLA state (persisted as "SLAPolicyTicket"): due dates, met
/// flags, and the pause ledger. Budgets are snapshotted from the policy at
/// assignment time, so later policy edits do not rewrite already-computed
/// deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaTracker {
    pub id: String,
    pub ticket_id: String,
    pub organization_id: String,
    pub sla_policy_id: String,
    pub first_response_hours: f64,
    pub next_response_hours: Option<f64>,
    pub resolution_hours: f64,
    pub business_hours_only: bool,
    pub ticket_created_at: DateTime<Utc>,
    pub first_response_due_at: DateTime<Utc>,
    pub next_response_due_at: Option<DateTime<Utc>>,
    pub resolution_due_at: DateTime<Utc>,
    pub first_response_met: Option<bool>,
    pub next_response_met: Option<bool>,
    pub resolution_met: Option<bool>,
    pub pause_periods: Vec<PausePeriod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SlaTracker {
    pub fn new(
        ticket: &TicketRecord,
        policy: &SlaPolicy,
        first_response_due_at: DateTime<Utc>,
        next_response_due_at: Option<DateTime<Utc>>,
        resolution_due_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ticket_id: ticket.id.clone(),
            organization_id: ticket.organization_id.clone(),
            sla_policy_id: policy.id.clone(),
            first_response_hours: policy.first_response_hours,
            next_response_hours: policy.next_response_hours,
            resolution_hours: policy.resolution_hours,
            business_hours_only: policy.business_hours_only,
            ticket_created_at: ticket.created_at,
            first_response_due_at,
            next_response_due_at,
            resolution_due_at,
            first_response_met: None,
            next_response_met: None,
            resolution_met: None,
            pause_periods: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A tracker counts as resolved once the resolution outcome is recorded,
    /// met or not.
    pub fn is_resolved(&self) -> bool {
        self.resolution_met.is_some()
    }

    /// Due dates must never precede the ticket's creation instant.
    pub fn validate_due_dates(&self) -> Result<(), String> {
        let mut dues = vec![self.first_response_due_at, self.resolution_due_at];
        if let Some(due) = self.next_response_due_at {
            dues.push(due);
        }
        for due in dues {
            if due < self.ticket_created_at {
                return Err("Due date precedes ticket creation".to_string());
            }
        }
        Ok(())
    }
}

// ===== Duration Parsing Utility =====

use regex::Regex;
use std::sync::OnceLock;

/// Parse duration string like "2h", "30m", "1d" into seconds
pub fn parse_duration(duration_str: &str) -> Result<i64, String> {
    static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = DURATION_REGEX
        .get_or_init(|| Regex::new(r"^(\d+)([hmd])$").expect("Invalid duration regex"));

    let caps = re.captures(duration_str).ok_or_else(|| {
        format!(
            "Invalid duration format: {}. Expected format: <number><h|m|d>",
            duration_str
        )
    })?;

    let number: i64 = caps[1]
        .parse()
        .map_err(|_| format!("Invalid number in duration: {}", &caps[1]))?;

    let unit = &caps[2];

    let seconds = match unit {
        "m" => number * 60,           // minutes to seconds
        "h" => number * 60 * 60,      // hours to seconds
        "d" => number * 60 * 60 * 24, // days to seconds
        _ => return Err(format!("Invalid duration unit: {}", unit)),
    };

    if seconds <= 0 {
        return Err("Duration must be greater than 0".to_string());
    }

    Ok(seconds)
}

/// Duration string to the fractional hour budget used by policies.
pub fn duration_hours(duration_str: &str) -> Result<f64, String> {
    parse_duration(duration_str).map(|seconds| seconds as f64 / 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration("2h").unwrap(), 7200);
        assert_eq!(parse_duration("1h").unwrap(), 3600);
        assert_eq!(parse_duration("24h").unwrap(), 86400);
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration("30m").unwrap(), 1800);
        assert_eq!(parse_duration("1m").unwrap(), 60);
        assert_eq!(parse_duration("120m").unwrap(), 7200);
    }

    #[test]
    fn test_parse_duration_days() {
        assert_eq!(parse_duration("1d").unwrap(), 86400);
        assert_eq!(parse_duration("2d").unwrap(), 172800);
    }

    #[test]
    fn test_parse_duration_invalid_format() {
        assert!(parse_duration("2x").is_err());
        assert!(parse_duration("h2").is_err());
        assert!(parse_duration("two hours").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_parse_duration_zero() {
        assert!(parse_duration("0h").is_err());
        assert!(parse_duration("0m").is_err());
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(duration_hours("2h").unwrap(), 2.0);
        assert_eq!(duration_hours("30m").unwrap(), 0.5);
        assert_eq!(duration_hours("1d").unwrap(), 24.0);
    }

    #[test]
    fn test_policy_rejects_negative_budget() {
        let mut policy = SlaPolicy::new(
            "org-001".to_string(),
            "prio-high".to_string(),
            "High".to_string(),
            None,
            4.0,
            Some(8.0),
            24.0,
            false,
        );
        assert!(policy.validate().is_ok());
        policy.resolution_hours = -1.0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_pause_period_canonical_json() {
        let period = PausePeriod::open("2024-01-10T10:00:00Z".parse().unwrap());
        let json = serde_json::to_string(&period).unwrap();
        assert!(json.contains("startedAt"));
        assert!(!json.contains("endedAt"));
    }
}
