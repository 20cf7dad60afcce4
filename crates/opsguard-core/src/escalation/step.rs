use serde::{Deserialize, Serialize};

use crate::channel::Channel;

use super::target::StepTarget;

/// One rung of an escalation ladder. `delay_minutes` is relative to the
/// previous step's firing (or to incident creation for step 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationStep {
    delay_minutes: u32,
    target: StepTarget,
    notify_only_team_lead: bool,
    channels: Vec<Channel>,
}

impl EscalationStep {
    pub fn new(delay_minutes: u32, target: StepTarget, channels: Vec<Channel>) -> Self {
        Self {
            delay_minutes,
            target,
            notify_only_team_lead: false,
            channels,
        }
    }

    /// Team steps can be narrowed to the lead only.
    pub fn lead_only(mut self) -> Self {
        self.notify_only_team_lead = true;
        self
    }

    pub fn delay_minutes(&self) -> u32 {
        self.delay_minutes
    }

    pub fn target(&self) -> &StepTarget {
        &self.target
    }

    pub fn notify_only_team_lead(&self) -> bool {
        self.notify_only_team_lead
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}
