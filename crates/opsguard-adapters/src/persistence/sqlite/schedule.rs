use async_trait::async_trait;

use opsguard_core::ids::ScheduleId;
use opsguard_core::schedule::Schedule;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::ScheduleRepository;

use super::SqliteDb;

#[async_trait]
impl ScheduleRepository for SqliteDb {
    async fn save(&self, schedule: &Schedule) -> Result<(), PortError> {
        let data =
            serde_json::to_string(schedule).map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO schedules (id, data) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .bind(schedule.id().to_string())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ScheduleId) -> Result<Option<Schedule>, PortError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM schedules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        match row {
            Some((data,)) => {
                let schedule: Schedule = serde_json::from_str(&data)
                    .map_err(|e| PortError::Persistence(e.to_string()))?;
                Ok(Some(schedule))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsguard_core::ids::UserId;
    use opsguard_core::schedule::ScheduleLayer;

    #[tokio::test]
    async fn save_roundtrips_timezone_and_layers() {
        let db = SqliteDb::new("sqlite::memory:").await.unwrap();
        let user = UserId::new();
        let layer = ScheduleLayer::new(
            "primary".into(),
            chrono::NaiveDateTime::parse_from_str("2025-01-06T09:00:00", "%Y-%m-%dT%H:%M:%S")
                .unwrap(),
            None,
            24,
            vec![user.clone()],
        )
        .unwrap();
        let schedule =
            Schedule::new("oncall".into(), "Europe/Zurich".parse().unwrap(), vec![layer]).unwrap();

        db.save(&schedule).await.unwrap();

        let found = db.find_by_id(schedule.id()).await.unwrap().unwrap();
        assert_eq!(found.timezone().name(), "Europe/Zurich");
        let at = chrono::DateTime::parse_from_rfc3339("2025-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(found.who_is_on_call(at), Some(user));
    }

    #[tokio::test]
    async fn unknown_schedule_is_none() {
        let db = SqliteDb::new("sqlite::memory:").await.unwrap();
        assert!(db.find_by_id(&ScheduleId::new()).await.unwrap().is_none());
    }
}
