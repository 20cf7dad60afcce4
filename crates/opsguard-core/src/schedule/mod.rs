pub mod layer;
pub mod shift_override;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{OverrideId, ScheduleId, UserId};

pub use layer::ScheduleLayer;
pub use shift_override::ScheduleOverride;

mod tz_serde {
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Tz, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Tz>().map_err(serde::de::Error::custom)
    }
}

/// An on-call roster: ordered layers plus overrides, resolved to "whoever
/// is on duty" at a given instant. Layer start/end are interpreted in the
/// schedule's timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    id: ScheduleId,
    name: String,
    #[serde(with = "tz_serde")]
    timezone: Tz,
    layers: Vec<ScheduleLayer>,
    overrides: Vec<ScheduleOverride>,
}

impl Schedule {
    pub fn new(name: String, timezone: Tz, layers: Vec<ScheduleLayer>) -> Result<Self, DomainError> {
        if layers.is_empty() {
            return Err(DomainError::ScheduleRequiresLayer);
        }
        Ok(Self {
            id: ScheduleId::new(),
            name,
            timezone,
            layers,
            overrides: vec![],
        })
    }

    /// Resolve the on-call user at `at`. Overrides win (latest added
    /// first); otherwise the first layer covering `at` rotates its
    /// participants. `None` when no layer covers the instant.
    pub fn who_is_on_call(&self, at: DateTime<Utc>) -> Option<UserId> {
        for ovr in self.overrides.iter().rev() {
            if ovr.is_active_at(at) {
                return Some(ovr.user_id().clone());
            }
        }
        self.layers.iter().find_map(|layer| self.layer_on_call(layer, at))
    }

    fn layer_on_call(&self, layer: &ScheduleLayer, at: DateTime<Utc>) -> Option<UserId> {
        let start = layer
            .start()
            .and_local_timezone(self.timezone)
            .earliest()?
            .with_timezone(&Utc);
        if at < start {
            return None;
        }
        if let Some(end) = layer.end() {
            let end = end
                .and_local_timezone(self.timezone)
                .earliest()?
                .with_timezone(&Utc);
            if at >= end {
                return None;
            }
        }

        let rotation_secs = i64::from(layer.rotation_hours()) * 3600;
        let elapsed = (at - start).num_seconds();
        let index = (elapsed / rotation_secs).rem_euclid(layer.participants().len() as i64) as usize;
        Some(layer.participants()[index].clone())
    }

    pub fn add_override(&mut self, ovr: ScheduleOverride) -> Result<(), DomainError> {
        if ovr.end() <= ovr.start() {
            return Err(DomainError::InvalidOverridePeriod);
        }
        self.overrides.push(ovr);
        Ok(())
    }

    pub fn remove_override(&mut self, override_id: &OverrideId) -> bool {
        let before = self.overrides.len();
        self.overrides.retain(|o| o.id() != override_id);
        self.overrides.len() != before
    }

    pub fn id(&self) -> &ScheduleId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    pub fn layers(&self) -> &[ScheduleLayer] {
        &self.layers
    }
}
