use serde::{Deserialize, Serialize};

use crate::event::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    High,
}

impl Urgency {
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical | Severity::Error => Self::High,
            Severity::Warning | Severity::Info => Self::Low,
        }
    }
}
