use async_trait::async_trait;
use chrono::{DateTime, Utc};

use opsguard_core::audit::IncidentEvent;
use opsguard_core::ids::IncidentId;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::IncidentEventLog;

use super::SqliteDb;

#[async_trait]
impl IncidentEventLog for SqliteDb {
    async fn append(&self, event: &IncidentEvent) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO incident_events (incident_id, message, created_at) VALUES (?, ?, ?)",
        )
        .bind(event.incident_id.to_string())
        .bind(&event.message)
        .bind(event.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn list_for_incident(&self, incident_id: &str) -> Result<Vec<IncidentEvent>, PortError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT incident_id, message, created_at FROM incident_events
             WHERE incident_id = ?
             ORDER BY id ASC",
        )
        .bind(incident_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        let mut events = Vec::with_capacity(rows.len());
        for (incident_id, message, created_at) in rows {
            events.push(IncidentEvent {
                incident_id: IncidentId::parse(&incident_id)
                    .map_err(|e| PortError::Persistence(e.to_string()))?,
                message,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| PortError::Persistence(e.to_string()))?
                    .with_timezone(&Utc),
            });
        }
        Ok(events)
    }
}
