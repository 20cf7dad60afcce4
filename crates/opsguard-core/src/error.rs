use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("incident is already resolved")]
    IncidentAlreadyResolved,
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("team requires at least one member")]
    TeamRequiresMember,
    #[error("schedule requires at least one layer")]
    ScheduleRequiresLayer,
    #[error("layer requires at least one participant")]
    LayerRequiresParticipant,
    #[error("invalid override period")]
    InvalidOverridePeriod,
    #[error("step requires a notification channel")]
    StepRequiresChannel,
}
