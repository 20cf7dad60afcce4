use async_trait::async_trait;

use opsguard_core::channel::Channel;
use opsguard_core::incident::Incident;
use opsguard_core::user::User;
use opsguard_ports::error::NotifyError;
use opsguard_ports::outbound::ChannelSender;

/// Logging sender used until real provider transports are wired in.
/// Every delivery succeeds and lands in the structured log, which is
/// enough to exercise the whole escalation path locally.
#[derive(Clone, Default)]
pub struct TracingSender;

impl TracingSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChannelSender for TracingSender {
    async fn send(
        &self,
        user: &User,
        incident: &Incident,
        channel: Channel,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            user = user.name(),
            email = user.email(),
            channel = channel.as_str(),
            incident_id = %incident.id(),
            title = incident.title(),
            "notification dispatched"
        );
        Ok(())
    }
}
