use async_trait::async_trait;

use opsguard_core::incident::Incident;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::IncidentRepository;

use super::SqliteDb;

fn row_values(incident: &Incident) -> Result<(String, String, String, String, i32, String, String), PortError> {
    let data =
        serde_json::to_string(incident).map_err(|e| PortError::Persistence(e.to_string()))?;
    Ok((
        incident.id().to_string(),
        incident.service_id().to_string(),
        incident.dedup_key().to_string(),
        format!("{:?}", incident.status()),
        i32::from(incident.status().is_open()),
        data,
        incident.created_at().to_rfc3339(),
    ))
}

fn decode(data: &str) -> Result<Incident, PortError> {
    serde_json::from_str(data).map_err(|e| PortError::Persistence(e.to_string()))
}

#[async_trait]
impl IncidentRepository for SqliteDb {
    async fn insert_open(&self, incident: &Incident) -> Result<(), PortError> {
        let (id, service_id, dedup_key, status, open, data, created_at) = row_values(incident)?;

        sqlx::query(
            "INSERT INTO incidents (id, service_id, dedup_key, status, open, data, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&service_id)
        .bind(&dedup_key)
        .bind(&status)
        .bind(open)
        .bind(&data)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => PortError::Conflict,
            _ => PortError::Persistence(e.to_string()),
        })?;

        Ok(())
    }

    async fn save(&self, incident: &Incident) -> Result<(), PortError> {
        let (id, service_id, dedup_key, status, open, data, created_at) = row_values(incident)?;

        sqlx::query(
            "INSERT INTO incidents (id, service_id, dedup_key, status, open, data, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                open = excluded.open,
                data = excluded.data",
        )
        .bind(&id)
        .bind(&service_id)
        .bind(&dedup_key)
        .bind(&status)
        .bind(open)
        .bind(&data)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Incident>, PortError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM incidents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        row.map(|(data,)| decode(&data)).transpose()
    }

    async fn find_open_by_dedup(
        &self,
        service_id: &str,
        dedup_key: &str,
    ) -> Result<Option<Incident>, PortError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT data FROM incidents
             WHERE service_id = ? AND dedup_key = ? AND open = 1
             LIMIT 1",
        )
        .bind(service_id)
        .bind(dedup_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        row.map(|(data,)| decode(&data)).transpose()
    }
}
