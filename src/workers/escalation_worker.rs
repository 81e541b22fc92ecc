use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::config::EngineConfig;
use crate::domain::errors::EngineResult;
use crate::domain::ports::{CalendarRepository, SlaTrackerRepository};
use crate::models::calendar::BusinessCalendar;
use crate::models::sla::SlaTracker;
use crate::services::escalation::{EscalationEngine, ScanOutcome};

/// Periodic background task that re-evaluates open trackers and dispatches
/// escalation events. Runs until the owning task is dropped.
pub struct EscalationWorker {
    tracker_repo: Arc<dyn SlaTrackerRepository>,
    calendar_repo: Arc<dyn CalendarRepository>,
    engine: EscalationEngine,
    scan_interval: Duration,
    batch_limit: usize,
}

impl EscalationWorker {
    pub fn new(
        tracker_repo: Arc<dyn SlaTrackerRepository>,
        calendar_repo: Arc<dyn CalendarRepository>,
        engine: EscalationEngine,
        config: &EngineConfig,
    ) -> Self {
        Self {
            tracker_repo,
            calendar_repo,
            engine,
            scan_interval: Duration::from_secs(config.escalation_scan_interval_secs),
            batch_limit: config.escalation_batch_limit,
        }
    }

    pub async fn run(&self) {
        info!(
            "Starting EscalationWorker (interval: {:?}, batch limit: {})...",
            self.scan_interval, self.batch_limit
        );
        loop {
            match self.scan_once().await {
                Ok(outcome) => {
                    if outcome.escalated > 0 || outcome.errors > 0 {
                        info!(
                            "Escalation scan: {} processed, {} escalated, {} errors",
                            outcome.processed, outcome.escalated, outcome.errors
                        );
                    }
                }
                Err(e) => {
                    error!("Escalation scan failed: {}", e);
                }
            }
            tokio::time::sleep(self.scan_interval).await;
        }
    }

    /// One batch: load unresolved trackers, fetch each organization's
    /// calendar once, and delegate to the engine scan.
    pub async fn scan_once(&self) -> EngineResult<ScanOutcome> {
        let now = Utc::now();
        let trackers = self
            .tracker_repo
            .list_unresolved_trackers(self.batch_limit as i64)
            .await?;

        let mut calendars: HashMap<String, BusinessCalendar> = HashMap::new();
        for tracker in &trackers {
            if !calendars.contains_key(&tracker.organization_id) {
                let calendar = self
                    .calendar_repo
                    .calendar_for_organization(&tracker.organization_id)
                    .await?
                    .unwrap_or_else(|| {
                        BusinessCalendar::new(tracker.organization_id.clone(), "UTC".to_string())
                    });
                calendars.insert(tracker.organization_id.clone(), calendar);
            }
        }

        let items: Vec<(&SlaTracker, &BusinessCalendar)> = trackers
            .iter()
            .filter_map(|tracker| {
                calendars
                    .get(&tracker.organization_id)
                    .map(|calendar| (tracker, calendar))
            })
            .collect();

        Ok(self.engine.scan(items, now, self.batch_limit).await)
    }
}
