use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::UserId;

/// One rotation layer. `start`/`end` are wall-clock times in the owning
/// schedule's timezone; participants rotate every `rotation_hours`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleLayer {
    name: String,
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
    rotation_hours: u32,
    participants: Vec<UserId>,
}

impl ScheduleLayer {
    pub fn new(
        name: String,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        rotation_hours: u32,
        participants: Vec<UserId>,
    ) -> Result<Self, DomainError> {
        if participants.is_empty() {
            return Err(DomainError::LayerRequiresParticipant);
        }
        Ok(Self {
            name,
            start,
            end,
            rotation_hours: rotation_hours.max(1),
            participants,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    pub fn rotation_hours(&self) -> u32 {
        self.rotation_hours
    }

    pub fn participants(&self) -> &[UserId] {
        &self.participants
    }
}
