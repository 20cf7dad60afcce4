use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::ids::{IncidentId, NotificationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

/// One delivery attempt: (incident, user, channel, step). Created Pending
/// before the sender is invoked, then marked Sent or Failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    incident_id: IncidentId,
    user_id: UserId,
    channel: Channel,
    step: u32,
    status: NotificationStatus,
    attempts: u32,
    error_msg: Option<String>,
    created_at: DateTime<Utc>,
}

impl Notification {
    pub fn pending(
        incident_id: IncidentId,
        user_id: UserId,
        channel: Channel,
        step: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            incident_id,
            user_id,
            channel,
            step,
            status: NotificationStatus::Pending,
            attempts: 0,
            error_msg: None,
            created_at: now,
        }
    }

    pub fn mark_sent(&mut self) {
        self.status = NotificationStatus::Sent;
        self.attempts += 1;
        self.error_msg = None;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = NotificationStatus::Failed;
        self.attempts += 1;
        self.error_msg = Some(error.into());
    }

    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    pub fn incident_id(&self) -> &IncidentId {
        &self.incident_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn status(&self) -> NotificationStatus {
        self.status
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn error_msg(&self) -> Option<&str> {
        self.error_msg.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        chrono::DateTime::parse_from_rfc3339("2025-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn lifecycle_pending_to_sent() {
        let mut n = Notification::pending(IncidentId::new(), UserId::new(), Channel::Email, 0, now());
        assert_eq!(n.status(), NotificationStatus::Pending);
        assert_eq!(n.attempts(), 0);

        n.mark_sent();
        assert_eq!(n.status(), NotificationStatus::Sent);
        assert_eq!(n.attempts(), 1);
        assert!(n.error_msg().is_none());
    }

    #[test]
    fn failure_records_error_and_attempt() {
        let mut n = Notification::pending(IncidentId::new(), UserId::new(), Channel::Sms, 2, now());
        n.mark_failed("gateway timeout");
        assert_eq!(n.status(), NotificationStatus::Failed);
        assert_eq!(n.attempts(), 1);
        assert_eq!(n.error_msg(), Some("gateway timeout"));
    }
}
