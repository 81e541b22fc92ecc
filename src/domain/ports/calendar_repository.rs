use crate::domain::errors::EngineResult;
use crate::models::calendar::BusinessCalendar;

/// Lookup seam for organization business calendars.
#[async_trait::async_trait]
pub trait CalendarRepository: Send + Sync {
    async fn calendar_for_organization(
        &self,
        organization_id: &str,
    ) -> EngineResult<Option<BusinessCalendar>>;
}
