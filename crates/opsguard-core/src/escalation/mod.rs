pub mod step;
pub mod target;

use serde::{Deserialize, Serialize};

use crate::ids::{PolicyId, ServiceId};

pub use step::EscalationStep;
pub use target::StepTarget;

/// Ordered escalation ladder, one per service. A policy may have zero
/// steps; such an incident completes escalation immediately. Steps are
/// immutable for the duration of one escalation run: the scheduler reads
/// the policy fresh on every firing but never rewrites an in-flight
/// incident's current step index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPolicy {
    id: PolicyId,
    name: String,
    service_id: ServiceId,
    steps: Vec<EscalationStep>,
}

impl EscalationPolicy {
    pub fn new(name: String, service_id: ServiceId, steps: Vec<EscalationStep>) -> Self {
        Self {
            id: PolicyId::new(),
            name,
            service_id,
            steps,
        }
    }

    pub fn step(&self, index: u32) -> Option<&EscalationStep> {
        self.steps.get(index as usize)
    }

    pub fn has_step(&self, index: u32) -> bool {
        (index as usize) < self.steps.len()
    }

    pub fn id(&self) -> &PolicyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn steps(&self) -> &[EscalationStep] {
        &self.steps
    }
}
