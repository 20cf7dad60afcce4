use serde::{Deserialize, Serialize};

use crate::ids::{ScheduleId, TeamId, UserId};

/// Who a step notifies. Exactly one target per step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepTarget {
    User(UserId),
    Team(TeamId),
    Schedule(ScheduleId),
}
