use async_trait::async_trait;
use chrono::{DateTime, Utc};

use opsguard_core::ids::IncidentId;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::EscalationJobQueue;
use opsguard_ports::types::{EscalationJob, JobStatus};

use super::SqliteDb;

#[async_trait]
impl EscalationJobQueue for SqliteDb {
    async fn schedule(
        &self,
        incident_id: &IncidentId,
        step: u32,
        fires_at: DateTime<Utc>,
    ) -> Result<String, PortError> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO escalation_jobs (id, incident_id, step, fires_at, status)
             VALUES (?, ?, ?, ?, 'pending')",
        )
        .bind(&id)
        .bind(incident_id.to_string())
        .bind(step as i64)
        .bind(fires_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(id)
    }

    async fn poll_due(&self, now: DateTime<Utc>) -> Result<Vec<EscalationJob>, PortError> {
        let rows: Vec<(String, String, i64, String)> = sqlx::query_as(
            "SELECT id, incident_id, step, fires_at FROM escalation_jobs
             WHERE status = 'pending' AND fires_at <= ?
             ORDER BY fires_at ASC",
        )
        .bind(now.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        let mut jobs = Vec::with_capacity(rows.len());
        for (id, incident_id, step, fires_at) in rows {
            jobs.push(EscalationJob {
                id,
                incident_id: IncidentId::parse(&incident_id)
                    .map_err(|e| PortError::Persistence(e.to_string()))?,
                step: step as u32,
                fires_at: DateTime::parse_from_rfc3339(&fires_at)
                    .map_err(|e| PortError::Persistence(e.to_string()))?
                    .with_timezone(&Utc),
                status: JobStatus::Pending,
            });
        }
        Ok(jobs)
    }

    async fn mark_fired(&self, id: &str) -> Result<(), PortError> {
        sqlx::query("UPDATE escalation_jobs SET status = 'fired' WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;
        Ok(())
    }
}
