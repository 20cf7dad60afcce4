//! The escalation engine. Starting an escalation arms step 0 and books a
//! durable delayed job; each firing re-validates live incident state, so
//! duplicate or stale deliveries degrade to no-ops instead of paging
//! people twice.

use chrono::{DateTime, Duration, Utc};

use opsguard_core::audit::IncidentEvent;
use opsguard_core::escalation::StepTarget;
use opsguard_core::incident::Incident;
use opsguard_ports::outbound::{
    ChannelSender, EscalationJobQueue, IncidentEventLog, IncidentRepository,
    NotificationRepository, PolicyRepository, ScheduleRepository, UserDirectory,
};
use opsguard_ports::types::EscalationJob;

use crate::dispatch::DispatchService;
use crate::error::AppError;

/// A processing lock older than this is treated as abandoned by a
/// crashed worker.
pub const PROCESSING_TTL_SECS: i64 = 120;

pub struct EscalationService<I, P, Q, L, N, U, SR, C> {
    incidents: I,
    policies: P,
    jobs: Q,
    log: L,
    dispatch: DispatchService<N, U, SR, C>,
}

impl<I, P, Q, L, N, U, SR, C> EscalationService<I, P, Q, L, N, U, SR, C>
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
    pub fn new(
        incidents: I,
        policies: P,
        jobs: Q,
        log: L,
        dispatch: DispatchService<N, U, SR, C>,
    ) -> Self {
        Self {
            incidents,
            policies,
            jobs,
            log,
            dispatch,
        }
    }

    /// Arm escalation for a freshly-opened incident. Without a policy the
    /// incident simply never escalates; a zero-step policy completes on
    /// the spot.
    pub async fn start(&self, incident: &mut Incident, now: DateTime<Utc>) -> Result<(), AppError> {
        let service_id = incident.service_id().to_string();
        let policy = match self.policies.find_by_service(&service_id).await? {
            Some(policy) => policy,
            None => {
                self.log
                    .append(&IncidentEvent::new(
                        incident.id().clone(),
                        "No escalation policy configured for service; not escalating",
                        now,
                    ))
                    .await?;
                return Ok(());
            }
        };

        match policy.step(0) {
            None => {
                let event = incident.complete_escalation_without_steps(now);
                self.incidents.save(incident).await?;
                self.log.append(&event).await?;
            }
            Some(first) => {
                let event = incident.begin_escalation(first.delay_minutes(), now);
                // The job is booked before the escalating state is saved;
                // a failed booking must not persist an armed incident that
                // no job will ever fire.
                if let Some(fires_at) = incident.next_escalation_at() {
                    self.jobs.schedule(incident.id(), 0, fires_at).await?;
                }
                self.incidents.save(incident).await?;
                self.log.append(&event).await?;
            }
        }
        Ok(())
    }

    /// Handle one job delivery. At-least-once semantics: any stale,
    /// duplicate or contended delivery returns `Ok` without side effects.
    pub async fn on_job_fired(&self, job: &EscalationJob, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut incident = match self.incidents.find_by_id(&job.incident_id.to_string()).await? {
            Some(incident) => incident,
            None => {
                tracing::warn!(job_id = %job.id, incident_id = %job.incident_id, "job references unknown incident");
                return Ok(());
            }
        };

        if !incident.is_step_due(job.step, now) {
            tracing::debug!(job_id = %job.id, step = job.step, "stale escalation job ignored");
            return Ok(());
        }

        if !incident.try_begin_processing(now, Duration::seconds(PROCESSING_TTL_SECS)) {
            tracing::debug!(job_id = %job.id, "incident is being processed by another worker");
            return Ok(());
        }
        self.incidents.save(&incident).await?;

        let result = self.fire_step(&mut incident, job.step, now).await;

        // The lock is released no matter how the step went.
        incident.finish_processing();
        self.incidents.save(&incident).await?;
        result
    }

    async fn fire_step(
        &self,
        incident: &mut Incident,
        step_index: u32,
        fired_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let service_id = incident.service_id().to_string();
        let policy = match self.policies.find_by_service(&service_id).await? {
            Some(policy) => policy,
            None => {
                incident.complete_escalation(fired_at);
                self.log
                    .append(&IncidentEvent::new(
                        incident.id().clone(),
                        "Escalation ended; policy was removed",
                        fired_at,
                    ))
                    .await?;
                return Ok(());
            }
        };
        let step = match policy.step(step_index) {
            Some(step) => step,
            None => {
                incident.complete_escalation(fired_at);
                self.log
                    .append(&IncidentEvent::new(
                        incident.id().clone(),
                        format!("Escalation ended; policy no longer defines step {}", step_index + 1),
                        fired_at,
                    ))
                    .await?;
                return Ok(());
            }
        };

        let outcomes = self
            .dispatch
            .dispatch_step(&*incident, step, step_index, fired_at)
            .await?;
        let sent = outcomes.iter().filter(|o| o.sent).count();
        let failed = outcomes.len() - sent;
        self.log
            .append(&IncidentEvent::new(
                incident.id().clone(),
                format!(
                    "Escalation step {} fired ({sent} sent, {failed} failed)",
                    step_index + 1
                ),
                fired_at,
            ))
            .await?;

        // A direct-user first step implicitly assigns the incident.
        if step_index == 0 && incident.assignee_id().is_none() {
            if let StepTarget::User(user_id) = step.target() {
                let event = incident.assign(user_id.clone(), fired_at);
                self.log.append(&event).await?;
            }
        }

        let next = step_index + 1;
        match policy.step(next) {
            Some(next_step) => {
                // The job is booked before the advance is recorded. If the
                // booking fails the incident stays at the current step, so
                // the redelivered job retries it instead of going stale.
                let fires_at = fired_at + Duration::minutes(i64::from(next_step.delay_minutes()));
                self.jobs.schedule(incident.id(), next, fires_at).await?;
                incident.advance_escalation(next, next_step.delay_minutes(), fired_at);
            }
            None => {
                let event = incident.complete_escalation(fired_at);
                self.log.append(&event).await?;
            }
        }
        Ok(())
    }
}
