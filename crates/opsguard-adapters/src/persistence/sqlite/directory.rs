use async_trait::async_trait;

use opsguard_core::ids::{TeamId, UserId};
use opsguard_core::user::{Team, User};
use opsguard_ports::error::PortError;
use opsguard_ports::outbound::UserDirectory;

use super::SqliteDb;

#[async_trait]
impl UserDirectory for SqliteDb {
    async fn save_user(&self, user: &User) -> Result<(), PortError> {
        let data = serde_json::to_string(user).map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO users (id, data) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .bind(user.id().to_string())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, PortError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        match row {
            Some((data,)) => {
                let user: User =
                    serde_json::from_str(&data).map_err(|e| PortError::Persistence(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn save_team(&self, team: &Team) -> Result<(), PortError> {
        let data = serde_json::to_string(team).map_err(|e| PortError::Persistence(e.to_string()))?;

        sqlx::query(
            "INSERT INTO teams (id, data) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .bind(team.id().to_string())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn find_team(&self, id: &TeamId) -> Result<Option<Team>, PortError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM teams WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Persistence(e.to_string()))?;

        match row {
            Some((data,)) => {
                let team: Team =
                    serde_json::from_str(&data).map_err(|e| PortError::Persistence(e.to_string()))?;
                Ok(Some(team))
            }
            None => Ok(None),
        }
    }
}
