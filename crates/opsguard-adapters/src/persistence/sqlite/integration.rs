use async_trait::async_trait;

use opsguard_core::integration::Integration;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::IntegrationRepository;

use super::SqliteDb;

#[async_trait]
impl IntegrationRepository for SqliteDb {
    async fn save(&self, integration: &Integration) -> Result<(), PortError> {
        let data = serde_json::to_string(integration)
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO integrations (id, data) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .bind(integration.id().to_string())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Integration>, PortError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM integrations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        match row {
            Some((data,)) => {
                let integration: Integration = serde_json::from_str(&data)
                    .map_err(|e| PortError::Persistence(e.to_string()))?;
                Ok(Some(integration))
            }
            None => Ok(None),
        }
    }
}
