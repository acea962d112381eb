//! PostgreSQL implementation of ConversationReader.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{AppId, ConversationId, DomainError, EndUserId, Timestamp};
use crate::domain::message::Conversation;
use crate::ports::ConversationReader;

/// PostgreSQL implementation of ConversationReader.
#[derive(Clone)]
pub struct PostgresConversationReader {
    pool: PgPool,
}

impl PostgresConversationReader {
    /// Creates a new PostgresConversationReader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationReader for PostgresConversationReader {
    async fn get_for_user(
        &self,
        app_id: &AppId,
        end_user_id: &EndUserId,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, app_id, from_end_user_id, name, created_at
            FROM conversations
            WHERE id = $1 AND app_id = $2 AND from_end_user_id = $3
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(app_id.as_uuid())
        .bind(end_user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch conversation: {}", e)))?;

        Ok(row.map(|row| {
            let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
            Conversation {
                id: ConversationId::from_uuid(row.get("id")),
                app_id: AppId::from_uuid(row.get("app_id")),
                from_end_user_id: row
                    .get::<Option<uuid::Uuid>, _>("from_end_user_id")
                    .map(EndUserId::from_uuid),
                name: row.get("name"),
                created_at: Timestamp::from_datetime(created_at),
            }
        }))
    }
}
