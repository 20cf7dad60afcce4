//! Event ingestion: dedup canonical events into incidents and hand
//! fresh incidents to the escalation engine. Uniqueness of one open
//! incident per `(service, dedup_key)` is enforced by the repository;
//! a loser of that race re-reads and retries, as an update when the
//! winner is still open or as a fresh create when it already resolved.

use chrono::{DateTime, Utc};

use opsguard_core::event::{AlertEvent, EventAction};
use opsguard_core::ids::ServiceId;
use opsguard_core::incident::Incident;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::{
    ChannelSender, EscalationJobQueue, IncidentEventLog, IncidentRepository,
    NotificationRepository, PolicyRepository, ScheduleRepository, UserDirectory,
};
use opsguard_ports::types::{IngestAction, IngestOutcome};

use crate::error::AppError;
use crate::escalation::EscalationService;

pub struct IngestService<I, P, Q, L, N, U, SR, C> {
    incidents: I,
    log: L,
    escalation: EscalationService<I, P, Q, L, N, U, SR, C>,
}

impl<I, P, Q, L, N, U, SR, C> IngestService<I, P, Q, L, N, U, SR, C>
where
    I: IncidentRepository,
    P: PolicyRepository,
    Q: EscalationJobQueue,
    L: IncidentEventLog,
    N: NotificationRepository,
    U: UserDirectory,
    SR: ScheduleRepository,
    C: ChannelSender,
{
    pub fn new(incidents: I, log: L, escalation: EscalationService<I, P, Q, L, N, U, SR, C>) -> Self {
        Self {
            incidents,
            log,
            escalation,
        }
    }

    pub async fn ingest(
        &self,
        service_id: &ServiceId,
        event: &AlertEvent,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, AppError> {
        match event.action {
            EventAction::Trigger => self.handle_trigger(service_id, event, now).await,
            EventAction::Acknowledge => self.handle_acknowledge(service_id, event, now).await,
            EventAction::Resolve => self.handle_resolve(service_id, event, now).await,
        }
    }

    async fn handle_trigger(
        &self,
        service_id: &ServiceId,
        event: &AlertEvent,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, AppError> {
        let service_key = service_id.to_string();
        loop {
            if let Some(existing) = self
                .incidents
                .find_open_by_dedup(&service_key, &event.dedup_key)
                .await?
            {
                return self.deduplicate(&existing, event, now).await;
            }

            let description = (!event.payload.custom_details.is_null())
                .then(|| event.payload.custom_details.to_string());
            let (mut incident, opened) = Incident::open(
                event.payload.summary.clone(),
                description,
                service_id.clone(),
                event.dedup_key.clone(),
                event.payload.severity,
                &event.payload.source,
                now,
            );

            match self.incidents.insert_open(&incident).await {
                Ok(()) => {
                    self.log.append(&opened).await?;
                    self.escalation.start(&mut incident, now).await?;

                    tracing::info!(incident_id = %incident.id(), dedup_key = %event.dedup_key, "incident opened");
                    return Ok(IngestOutcome {
                        incident_id: Some(incident.id().clone()),
                        created: true,
                        action: IngestAction::Triggered,
                    });
                }
                // Someone opened the same incident between our lookup and
                // the insert. Go around again: the winner is usually still
                // open and this event becomes an update for theirs, but it
                // may already have resolved, in which case a fresh insert
                // wins the next pass.
                Err(PortError::Conflict) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn deduplicate(
        &self,
        existing: &Incident,
        event: &AlertEvent,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, AppError> {
        let audit = existing.record_retrigger(&event.payload.source, &event.payload.summary, now);
        self.log.append(&audit).await?;
        Ok(IngestOutcome {
            incident_id: Some(existing.id().clone()),
            created: false,
            action: IngestAction::Deduplicated,
        })
    }

    async fn handle_acknowledge(
        &self,
        service_id: &ServiceId,
        event: &AlertEvent,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, AppError> {
        let existing = self
            .incidents
            .find_open_by_dedup(&service_id.to_string(), &event.dedup_key)
            .await?;
        let mut incident = match existing {
            Some(incident) => incident,
            None => return Ok(ignored()),
        };

        if let Some(audit) = incident.acknowledge(&event.payload.source, now)? {
            self.incidents.save(&incident).await?;
            self.log.append(&audit).await?;
        }
        Ok(IngestOutcome {
            incident_id: Some(incident.id().clone()),
            created: false,
            action: IngestAction::Acknowledged,
        })
    }

    async fn handle_resolve(
        &self,
        service_id: &ServiceId,
        event: &AlertEvent,
        now: DateTime<Utc>,
    ) -> Result<IngestOutcome, AppError> {
        let existing = self
            .incidents
            .find_open_by_dedup(&service_id.to_string(), &event.dedup_key)
            .await?;
        let mut incident = match existing {
            Some(incident) => incident,
            None => return Ok(ignored()),
        };

        if let Some(audit) = incident.resolve(&event.payload.source, now) {
            self.incidents.save(&incident).await?;
            self.log.append(&audit).await?;
        }
        Ok(IngestOutcome {
            incident_id: Some(incident.id().clone()),
            created: false,
            action: IngestAction::Resolved,
        })
    }
}

/// An ack or resolve with no matching open incident is recorded as
/// ignored rather than erroring; the remote system may simply be ahead
/// of us.
fn ignored() -> IngestOutcome {
    IngestOutcome {
        incident_id: None,
        created: false,
        action: IngestAction::Ignored,
    }
}
