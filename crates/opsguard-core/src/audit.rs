use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::IncidentId;

/// Append-only audit entry on an incident timeline. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentEvent {
    pub incident_id: IncidentId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl IncidentEvent {
    pub fn new(incident_id: IncidentId, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            incident_id,
            message: message.into(),
            created_at: now,
        }
    }
}
