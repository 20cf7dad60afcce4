pub mod status;
pub mod urgency;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::IncidentEvent;
use crate::error::DomainError;
use crate::event::Severity;
use crate::ids::{IncidentId, ServiceId, UserId};

pub use status::Status;
pub use urgency::Urgency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationStatus {
    Escalating,
    Complete,
    Stopped,
}

/// The incident aggregate. The single source of truth every actor
/// (ingestion, escalation job, manual action) reads, checks and writes.
///
/// Invariant: `next_escalation_at` is `Some` iff `escalation_status` is
/// `Some(Escalating)`. All transitions below preserve it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    id: IncidentId,
    title: String,
    description: Option<String>,
    status: Status,
    urgency: Urgency,
    service_id: ServiceId,
    assignee_id: Option<UserId>,
    dedup_key: String,
    escalation_status: Option<EscalationStatus>,
    current_step: Option<u32>,
    next_escalation_at: Option<DateTime<Utc>>,
    processing_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    acknowledged_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
}

impl Incident {
    pub fn open(
        title: String,
        description: Option<String>,
        service_id: ServiceId,
        dedup_key: String,
        severity: Severity,
        source: &str,
        now: DateTime<Utc>,
    ) -> (Self, IncidentEvent) {
        let id = IncidentId::new();
        let incident = Self {
            id: id.clone(),
            title,
            description,
            status: Status::Open,
            urgency: Urgency::from_severity(severity),
            service_id,
            assignee_id: None,
            dedup_key,
            escalation_status: None,
            current_step: None,
            next_escalation_at: None,
            processing_at: None,
            created_at: now,
            acknowledged_at: None,
            resolved_at: None,
        };
        let event = IncidentEvent::new(id, format!("Incident triggered from {source}"), now);
        (incident, event)
    }

    /// A repeated trigger for an already-open incident is a pure audit
    /// no-op: the timeline records the redelivery, nothing else changes.
    pub fn record_retrigger(&self, source: &str, summary: &str, now: DateTime<Utc>) -> IncidentEvent {
        IncidentEvent::new(
            self.id.clone(),
            format!("Re-triggered by event from {source}. Summary: {summary}"),
            now,
        )
    }

    pub fn acknowledge(
        &mut self,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<IncidentEvent>, DomainError> {
        match self.status {
            Status::Resolved => Err(DomainError::IncidentAlreadyResolved),
            Status::Acknowledged => Ok(None),
            Status::Open | Status::Snoozed | Status::Suppressed => {
                self.status = Status::Acknowledged;
                if self.acknowledged_at.is_none() {
                    self.acknowledged_at = Some(now);
                }
                self.stop_escalation();
                Ok(Some(IncidentEvent::new(
                    self.id.clone(),
                    format!("Acknowledged via {source} (escalation stopped)"),
                    now,
                )))
            }
        }
    }

    pub fn resolve(&mut self, source: &str, now: DateTime<Utc>) -> Option<IncidentEvent> {
        if self.status == Status::Resolved {
            return None;
        }
        self.status = Status::Resolved;
        if self.resolved_at.is_none() {
            self.resolved_at = Some(now);
        }
        self.stop_escalation();
        Some(IncidentEvent::new(
            self.id.clone(),
            format!("Resolved via {source} (escalation stopped)"),
            now,
        ))
    }

    pub fn snooze(&mut self, now: DateTime<Utc>) -> Result<Option<IncidentEvent>, DomainError> {
        self.pause(Status::Snoozed, "Incident snoozed (escalation paused)", now)
    }

    pub fn suppress(&mut self, now: DateTime<Utc>) -> Result<Option<IncidentEvent>, DomainError> {
        self.pause(
            Status::Suppressed,
            "Incident suppressed (escalation paused)",
            now,
        )
    }

    fn pause(
        &mut self,
        to: Status,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<IncidentEvent>, DomainError> {
        match self.status {
            Status::Resolved => Err(DomainError::IncidentAlreadyResolved),
            s if s == to => Ok(None),
            _ => {
                self.status = to;
                self.stop_escalation();
                Ok(Some(IncidentEvent::new(self.id.clone(), message, now)))
            }
        }
    }

    pub fn assign(&mut self, user_id: UserId, now: DateTime<Utc>) -> IncidentEvent {
        self.assignee_id = Some(user_id.clone());
        IncidentEvent::new(self.id.clone(), format!("Assigned to {user_id}"), now)
    }

    // --- escalation state machine ---

    pub fn begin_escalation(&mut self, first_delay_minutes: u32, now: DateTime<Utc>) -> IncidentEvent {
        self.escalation_status = Some(EscalationStatus::Escalating);
        self.current_step = Some(0);
        self.next_escalation_at = Some(now + Duration::minutes(i64::from(first_delay_minutes)));
        IncidentEvent::new(
            self.id.clone(),
            format!("Escalation started (step 1 in {first_delay_minutes}m)"),
            now,
        )
    }

    /// A policy with no steps completes without ever dispatching.
    pub fn complete_escalation_without_steps(&mut self, now: DateTime<Utc>) -> IncidentEvent {
        self.escalation_status = Some(EscalationStatus::Complete);
        self.current_step = None;
        self.next_escalation_at = None;
        IncidentEvent::new(
            self.id.clone(),
            "Escalation complete (policy has no steps)",
            now,
        )
    }

    /// Advance to the next step. The next fire time is computed relative
    /// to the actual firing time, not the original schedule, so a backlog
    /// never produces a catch-up burst.
    pub fn advance_escalation(&mut self, next_step: u32, delay_minutes: u32, fired_at: DateTime<Utc>) {
        self.escalation_status = Some(EscalationStatus::Escalating);
        self.current_step = Some(next_step);
        self.next_escalation_at = Some(fired_at + Duration::minutes(i64::from(delay_minutes)));
    }

    pub fn complete_escalation(&mut self, now: DateTime<Utc>) -> IncidentEvent {
        self.escalation_status = Some(EscalationStatus::Complete);
        self.next_escalation_at = None;
        IncidentEvent::new(self.id.clone(), "Escalation complete (all steps fired)", now)
    }

    fn stop_escalation(&mut self) {
        if self.escalation_status == Some(EscalationStatus::Escalating) {
            self.escalation_status = Some(EscalationStatus::Stopped);
        }
        self.next_escalation_at = None;
    }

    /// Stale/duplicate-delivery check that makes job firing idempotent.
    /// A job is due only when the incident is still escalating, the job's
    /// step is the current one, and the recorded fire time has passed.
    pub fn is_step_due(&self, step: u32, now: DateTime<Utc>) -> bool {
        self.escalation_status == Some(EscalationStatus::Escalating)
            && self.current_step == Some(step)
            && self.next_escalation_at.is_some_and(|at| at <= now)
    }

    /// Short-lived mutex around one step's work. A lock older than `ttl`
    /// is treated as abandoned so a crash can never wedge the incident.
    pub fn try_begin_processing(&mut self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if let Some(held_at) = self.processing_at {
            if now - held_at < ttl {
                return false;
            }
        }
        self.processing_at = Some(now);
        true
    }

    pub fn finish_processing(&mut self) {
        self.processing_at = None;
    }

    // --- accessors ---

    pub fn id(&self) -> &IncidentId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn urgency(&self) -> Urgency {
        self.urgency
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn assignee_id(&self) -> Option<&UserId> {
        self.assignee_id.as_ref()
    }

    pub fn dedup_key(&self) -> &str {
        &self.dedup_key
    }

    pub fn escalation_status(&self) -> Option<EscalationStatus> {
        self.escalation_status
    }

    pub fn current_step(&self) -> Option<u32> {
        self.current_step
    }

    pub fn next_escalation_at(&self) -> Option<DateTime<Utc>> {
        self.next_escalation_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn acknowledged_at(&self) -> Option<DateTime<Utc>> {
        self.acknowledged_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }
}
