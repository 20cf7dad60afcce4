//! Turns one escalation step into concrete deliveries: resolve the
//! step's target to users, then attempt every declared channel for every
//! recipient. One channel failing never short-circuits the others; each
//! attempt is persisted as a [`Notification`].

use chrono::{DateTime, Utc};

use opsguard_core::escalation::{EscalationStep, StepTarget};
use opsguard_core::ids::UserId;
use opsguard_core::incident::Incident;
use opsguard_core::notification::Notification;
use opsguard_ports::outbound::{
    ChannelSender, NotificationRepository, ScheduleRepository, UserDirectory,
};
use opsguard_ports::types::DeliveryOutcome;

use crate::error::AppError;

pub struct DispatchService<N, U, SR, C> {
    notifications: N,
    users: U,
    schedules: SR,
    sender: C,
}

impl<N, U, SR, C> DispatchService<N, U, SR, C>
where
    N: NotificationRepository,
    U: UserDirectory,
    SR: ScheduleRepository,
    C: ChannelSender,
{
    pub fn new(notifications: N, users: U, schedules: SR, sender: C) -> Self {
        Self {
            notifications,
            users,
            schedules,
            sender,
        }
    }

    pub async fn dispatch_step(
        &self,
        incident: &Incident,
        step: &EscalationStep,
        step_index: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<DeliveryOutcome>, AppError> {
        let recipients = self.resolve_target(step, now).await?;
        if recipients.is_empty() {
            tracing::warn!(
                incident_id = %incident.id(),
                step = step_index,
                "escalation step resolved to no recipients"
            );
            return Ok(vec![]);
        }

        let mut outcomes = Vec::new();
        for user_id in recipients {
            let user = match self.users.find_user(&user_id).await? {
                Some(user) => user,
                None => {
                    tracing::warn!(user_id = %user_id, "step target references unknown user");
                    continue;
                }
            };

            for &channel in step.channels() {
                let mut notification = Notification::pending(
                    incident.id().clone(),
                    user_id.clone(),
                    channel,
                    step_index,
                    now,
                );
                let error = if !user.reachable_on(channel) {
                    Some("no destination configured for channel".to_string())
                } else {
                    match self.sender.send(&user, incident, channel).await {
                        Ok(()) => None,
                        Err(e) => Some(e.to_string()),
                    }
                };
                match &error {
                    None => notification.mark_sent(),
                    Some(msg) => notification.mark_failed(msg.clone()),
                }
                self.notifications.save(&notification).await?;
                outcomes.push(DeliveryOutcome {
                    user_id: user_id.clone(),
                    channel,
                    sent: error.is_none(),
                    error,
                });
            }
        }
        Ok(outcomes)
    }

    async fn resolve_target(
        &self,
        step: &EscalationStep,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserId>, AppError> {
        match step.target() {
            StepTarget::User(id) => Ok(vec![id.clone()]),
            StepTarget::Team(id) => match self.users.find_team(id).await? {
                Some(team) if step.notify_only_team_lead() => Ok(vec![team.lead().clone()]),
                Some(team) => Ok(team.members().to_vec()),
                None => {
                    tracing::warn!(team_id = %id, "step targets unknown team");
                    Ok(vec![])
                }
            },
            StepTarget::Schedule(id) => match self.schedules.find_by_id(id).await? {
                Some(schedule) => Ok(schedule.who_is_on_call(now).into_iter().collect()),
                None => {
                    tracing::warn!(schedule_id = %id, "step targets unknown schedule");
                    Ok(vec![])
                }
            },
        }
    }
}
