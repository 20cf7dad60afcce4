use async_trait::async_trait;

use opsguard_core::escalation::EscalationPolicy;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::PolicyRepository;

use super::SqliteDb;

#[async_trait]
impl PolicyRepository for SqliteDb {
    async fn save(&self, policy: &EscalationPolicy) -> Result<(), PortError> {
        let data =
            serde_json::to_string(policy).map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO escalation_policies (id, service_id, data)
             VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                service_id = excluded.service_id,
                data = excluded.data",
        )
        .bind(policy.id().to_string())
        .bind(policy.service_id().to_string())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_service(&self, service_id: &str) -> Result<Option<EscalationPolicy>, PortError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT data FROM escalation_policies WHERE service_id = ? LIMIT 1",
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        match row {
            Some((data,)) => {
                let policy: EscalationPolicy = serde_json::from_str(&data)
                    .map_err(|e| PortError::Persistence(e.to_string()))?;
                Ok(Some(policy))
            }
            None => Ok(None),
        }
    }
}
