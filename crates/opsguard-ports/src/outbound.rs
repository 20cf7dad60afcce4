use async_trait::async_trait;
use chrono::{DateTime, Utc};

use opsguard_core::audit::IncidentEvent;
use opsguard_core::channel::Channel;
use opsguard_core::escalation::EscalationPolicy;
use opsguard_core::ids::{IncidentId, ScheduleId, TeamId, UserId};
use opsguard_core::incident::Incident;
use opsguard_core::integration::Integration;
use opsguard_core::notification::Notification;
use opsguard_core::ratelimit::TokenBucket;
use opsguard_core::schedule::Schedule;
use opsguard_core::user::{Team, User};

use crate::error::{NotifyError, PortError};
use crate::types::EscalationJob;

#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Insert a freshly-opened incident. Fails with `PortError::Conflict`
    /// when another open incident already holds `(service_id, dedup_key)`.
    async fn insert_open(&self, incident: &Incident) -> Result<(), PortError>;
    async fn save(&self, incident: &Incident) -> Result<(), PortError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Incident>, PortError>;
    async fn find_open_by_dedup(
        &self,
        service_id: &str,
        dedup_key: &str,
    ) -> Result<Option<Incident>, PortError>;
}

#[async_trait]
pub trait IncidentEventLog: Send + Sync {
    async fn append(&self, event: &IncidentEvent) -> Result<(), PortError>;
    async fn list_for_incident(&self, incident_id: &str) -> Result<Vec<IncidentEvent>, PortError>;
}

#[async_trait]
pub trait PolicyRepository: Send + Sync {
    async fn save(&self, policy: &EscalationPolicy) -> Result<(), PortError>;
    async fn find_by_service(&self, service_id: &str) -> Result<Option<EscalationPolicy>, PortError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn save(&self, schedule: &Schedule) -> Result<(), PortError>;
    async fn find_by_id(&self, id: &ScheduleId) -> Result<Option<Schedule>, PortError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn save_user(&self, user: &User) -> Result<(), PortError>;
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, PortError>;
    async fn save_team(&self, team: &Team) -> Result<(), PortError>;
    async fn find_team(&self, id: &TeamId) -> Result<Option<Team>, PortError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn save(&self, notification: &Notification) -> Result<(), PortError>;
    async fn list_for_incident(&self, incident_id: &str) -> Result<Vec<Notification>, PortError>;
}

#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    async fn save(&self, integration: &Integration) -> Result<(), PortError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Integration>, PortError>;
}

/// Durable delayed-job primitive backing the escalation scheduler.
/// Survives restarts; delivers at least once; never early relative to
/// `fires_at` as observed by the poller's clock.
#[async_trait]
pub trait EscalationJobQueue: Send + Sync {
    async fn schedule(
        &self,
        incident_id: &IncidentId,
        step: u32,
        fires_at: DateTime<Utc>,
    ) -> Result<String, PortError>;
    async fn poll_due(&self, now: DateTime<Utc>) -> Result<Vec<EscalationJob>, PortError>;
    async fn mark_fired(&self, id: &str) -> Result<(), PortError>;
}

/// Opaque delivery capability. The engine interprets the result only as
/// success or failure; wire formats belong to the sender.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(
        &self,
        user: &User,
        incident: &Incident,
        channel: Channel,
    ) -> Result<(), NotifyError>;
}

/// Key→bucket state store behind the rate limiter, so the same logic
/// runs against an in-process map in tests and a shared store in
/// production.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<TokenBucket>, PortError>;
    async fn put(&self, key: &str, bucket: TokenBucket) -> Result<(), PortError>;
    async fn reset(&self, key: &str) -> Result<(), PortError>;
}
