use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Open,
    Acknowledged,
    Resolved,
    Snoozed,
    Suppressed,
}

impl Status {
    /// Resolved is terminal; everything else counts as open for dedup.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved)
    }
}
