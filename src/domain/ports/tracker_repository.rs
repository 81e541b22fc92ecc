use crate::domain::errors::EngineResult;
use crate::models::sla::SlaTracker;

/// Persistence seam for SLA trackers. The engine reads batches here and
/// hands updated records back; storage mechanics are the collaborator's
/// concern.
#[async_trait::async_trait]
pub trait SlaTrackerRepository: Send + Sync {
    /// Trackers whose resolution outcome is not yet recorded, oldest first.
    async fn list_unresolved_trackers(&self, limit: i64) -> EngineResult<Vec<SlaTracker>>;

    /// Upsert a tracker record transactionally.
    async fn upsert_tracker(&self, tracker: &SlaTracker) -> EngineResult<()>;
}
