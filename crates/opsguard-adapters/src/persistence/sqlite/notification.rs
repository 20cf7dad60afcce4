use async_trait::async_trait;

use opsguard_core::notification::Notification;
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::NotificationRepository;

use super::SqliteDb;

#[async_trait]
impl NotificationRepository for SqliteDb {
    async fn save(&self, notification: &Notification) -> Result<(), PortError> {
        let data = serde_json::to_string(notification)
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO notifications (id, incident_id, data, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .bind(notification.id().to_string())
        .bind(notification.incident_id().to_string())
        .bind(&data)
        .bind(notification.created_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn list_for_incident(&self, incident_id: &str) -> Result<Vec<Notification>, PortError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT data FROM notifications WHERE incident_id = ? ORDER BY created_at ASC",
        )
        .bind(incident_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        let mut notifications = Vec::with_capacity(rows.len());
        for (data,) in rows {
            let notification: Notification =
                serde_json::from_str(&data).map_err(|e| PortError::Persistence(e.to_string()))?;
            notifications.push(notification);
        }
        Ok(notifications)
    }
}
