//! In-memory port doubles shared by the service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use opsguard_core::audit::IncidentEvent;
use opsguard_core::channel::Channel;
use opsguard_core::escalation::EscalationPolicy;
use opsguard_core::ids::{IncidentId, ScheduleId, TeamId, UserId};
use opsguard_core::incident::Incident;
use opsguard_core::notification::Notification;
use opsguard_core::ratelimit::TokenBucket;
use opsguard_core::schedule::Schedule;
use opsguard_core::user::{Team, User};
use opsguard_ports::error::{NotifyError, PortError};
use opsguard_ports::outbound::{
    ChannelSender, EscalationJobQueue, IncidentEventLog, IncidentRepository,
    NotificationRepository, PolicyRepository, RateLimitStore, ScheduleRepository, UserDirectory,
};
use opsguard_ports::types::{EscalationJob, JobStatus};

#[derive(Clone, Default)]
pub(crate) struct MockIncidents {
    inner: Arc<Mutex<Vec<Incident>>>,
}

impl MockIncidents {
    pub(crate) fn all(&self) -> Vec<Incident> {
        self.inner.lock().unwrap().clone()
    }
}

#[async_trait]
impl IncidentRepository for MockIncidents {
    async fn insert_open(&self, incident: &Incident) -> Result<(), PortError> {
        let mut inner = self.inner.lock().unwrap();
        let taken = inner.iter().any(|i| {
            i.status().is_open()
                && i.service_id() == incident.service_id()
                && i.dedup_key() == incident.dedup_key()
        });
        if taken {
            return Err(PortError::Conflict);
        }
        inner.push(incident.clone());
        Ok(())
    }

    async fn save(&self, incident: &Incident) -> Result<(), PortError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.iter_mut().find(|i| i.id() == incident.id()) {
            Some(slot) => *slot = incident.clone(),
            None => inner.push(incident.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Incident>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.iter().find(|i| i.id().to_string() == id).cloned())
    }

    async fn find_open_by_dedup(
        &self,
        service_id: &str,
        dedup_key: &str,
    ) -> Result<Option<Incident>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .iter()
            .find(|i| {
                i.status().is_open()
                    && i.service_id().to_string() == service_id
                    && i.dedup_key() == dedup_key
            })
            .cloned())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockEventLog {
    inner: Arc<Mutex<Vec<IncidentEvent>>>,
}

impl MockEventLog {
    pub(crate) fn messages_for(&self, incident_id: &IncidentId) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.incident_id == incident_id)
            .map(|e| e.message.clone())
            .collect()
    }
}

#[async_trait]
impl IncidentEventLog for MockEventLog {
    async fn append(&self, event: &IncidentEvent) -> Result<(), PortError> {
        self.inner.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn list_for_incident(&self, incident_id: &str) -> Result<Vec<IncidentEvent>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .iter()
            .filter(|e| e.incident_id.to_string() == incident_id)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockPolicies {
    inner: Arc<Mutex<Vec<EscalationPolicy>>>,
}

#[async_trait]
impl PolicyRepository for MockPolicies {
    async fn save(&self, policy: &EscalationPolicy) -> Result<(), PortError> {
        let mut inner = self.inner.lock().unwrap();
        inner.retain(|p| p.id() != policy.id());
        inner.push(policy.clone());
        Ok(())
    }

    async fn find_by_service(&self, service_id: &str) -> Result<Option<EscalationPolicy>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .iter()
            .find(|p| p.service_id().to_string() == service_id)
            .cloned())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockSchedules {
    inner: Arc<Mutex<Vec<Schedule>>>,
}

#[async_trait]
impl ScheduleRepository for MockSchedules {
    async fn save(&self, schedule: &Schedule) -> Result<(), PortError> {
        let mut inner = self.inner.lock().unwrap();
        inner.retain(|s| s.id() != schedule.id());
        inner.push(schedule.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ScheduleId) -> Result<Option<Schedule>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.iter().find(|s| s.id() == id).cloned())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockDirectory {
    users: Arc<Mutex<Vec<User>>>,
    teams: Arc<Mutex<Vec<Team>>>,
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn save_user(&self, user: &User) -> Result<(), PortError> {
        let mut users = self.users.lock().unwrap();
        users.retain(|u| u.id() != user.id());
        users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, PortError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id() == id).cloned())
    }

    async fn save_team(&self, team: &Team) -> Result<(), PortError> {
        let mut teams = self.teams.lock().unwrap();
        teams.retain(|t| t.id() != team.id());
        teams.push(team.clone());
        Ok(())
    }

    async fn find_team(&self, id: &TeamId) -> Result<Option<Team>, PortError> {
        let teams = self.teams.lock().unwrap();
        Ok(teams.iter().find(|t| t.id() == id).cloned())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockNotifications {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotifications {
    pub(crate) fn all(&self) -> Vec<Notification> {
        self.inner.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationRepository for MockNotifications {
    async fn save(&self, notification: &Notification) -> Result<(), PortError> {
        let mut inner = self.inner.lock().unwrap();
        inner.retain(|n| n.id() != notification.id());
        inner.push(notification.clone());
        Ok(())
    }

    async fn list_for_incident(&self, incident_id: &str) -> Result<Vec<Notification>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .iter()
            .filter(|n| n.incident_id().to_string() == incident_id)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockJobQueue {
    inner: Arc<Mutex<Vec<EscalationJob>>>,
}

impl MockJobQueue {
    pub(crate) fn all(&self) -> Vec<EscalationJob> {
        self.inner.lock().unwrap().clone()
    }

    pub(crate) fn pending(&self) -> Vec<EscalationJob> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EscalationJobQueue for MockJobQueue {
    async fn schedule(
        &self,
        incident_id: &IncidentId,
        step: u32,
        fires_at: DateTime<Utc>,
    ) -> Result<String, PortError> {
        let id = format!("{incident_id}:{step}");
        self.inner.lock().unwrap().push(EscalationJob {
            id: id.clone(),
            incident_id: incident_id.clone(),
            step,
            fires_at,
            status: JobStatus::Pending,
        });
        Ok(id)
    }

    async fn poll_due(&self, now: DateTime<Utc>) -> Result<Vec<EscalationJob>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .iter()
            .filter(|j| j.status == JobStatus::Pending && j.fires_at <= now)
            .cloned()
            .collect())
    }

    async fn mark_fired(&self, id: &str) -> Result<(), PortError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(job) = inner.iter_mut().find(|j| j.id == id) {
            job.status = JobStatus::Fired;
        }
        Ok(())
    }
}

/// Records every accepted send; channels listed in `failing` error out
/// with `DeliveryFailed`.
#[derive(Clone, Default)]
pub(crate) struct MockSender {
    sent: Arc<Mutex<Vec<(UserId, Channel)>>>,
    failing: Arc<Mutex<Vec<Channel>>>,
}

impl MockSender {
    pub(crate) fn fail_on(&self, channel: Channel) {
        self.failing.lock().unwrap().push(channel);
    }

    pub(crate) fn sent(&self) -> Vec<(UserId, Channel)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelSender for MockSender {
    async fn send(
        &self,
        user: &User,
        _incident: &Incident,
        channel: Channel,
    ) -> Result<(), NotifyError> {
        if self.failing.lock().unwrap().contains(&channel) {
            return Err(NotifyError::DeliveryFailed("simulated outage".into()));
        }
        self.sent.lock().unwrap().push((user.id().clone(), channel));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockRateStore {
    inner: Arc<Mutex<HashMap<String, TokenBucket>>>,
}

#[async_trait]
impl RateLimitStore for MockRateStore {
    async fn get(&self, key: &str) -> Result<Option<TokenBucket>, PortError> {
        Ok(self.inner.lock().unwrap().get(key).copied())
    }

    async fn put(&self, key: &str, bucket: TokenBucket) -> Result<(), PortError> {
        self.inner.lock().unwrap().insert(key.to_string(), bucket);
        Ok(())
    }

    async fn reset(&self, key: &str) -> Result<(), PortError> {
        self.inner.lock().unwrap().remove(key);
        Ok(())
    }
}
