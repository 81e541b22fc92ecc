use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket priority record as supplied by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Priority {
    pub id: String,
    pub name: String,
}

impl Priority {
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
        }
    }
}

/// The slice of a ticket the engine needs: identity, creation instant,
/// priority/organization for policy resolution, and the raw status name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: String,
    pub organization_id: String,
    pub priority_id: Option<String>,
    pub status_name: String,
    pub created_at: DateTime<Utc>,
}

impl TicketRecord {
    pub fn new(organization_id: String, status_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id,
            priority_id: None,
            status_name,
            created_at: Utc::now(),
        }
    }
}
