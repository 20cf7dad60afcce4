use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use opsguard_core::channel::Channel;
use opsguard_core::ids::{IncidentId, UserId};

/// What ingestion did with one canonical event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    pub incident_id: Option<IncidentId>,
    pub created: bool,
    pub action: IngestAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestAction {
    Triggered,
    Deduplicated,
    Acknowledged,
    Resolved,
    Ignored,
}

/// A durable "run this later" record keyed by `(incident_id, step)`.
/// Delivery is at-least-once; the fire handler re-validates live state.
#[derive(Debug, Clone)]
pub struct EscalationJob {
    pub id: String,
    pub incident_id: IncidentId,
    pub step: u32,
    pub fires_at: DateTime<Utc>,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Fired,
}

/// Per-recipient-per-channel result of dispatching one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub user_id: UserId,
    pub channel: Channel,
    pub sent: bool,
    pub error: Option<String>,
}
