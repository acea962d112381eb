//! PostgreSQL implementation of FeedbackRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{AppId, DomainError, EndUserId, FeedbackId, MessageId};
use crate::domain::message::{FeedbackSource, MessageFeedback};
use crate::ports::FeedbackRepository;

use super::message_reader::row_to_feedback;

/// PostgreSQL implementation of FeedbackRepository.
#[derive(Clone)]
pub struct PostgresFeedbackRepository {
    pool: PgPool,
}

impl PostgresFeedbackRepository {
    /// Creates a new PostgresFeedbackRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn source_to_str(source: FeedbackSource) -> &'static str {
    match source {
        FeedbackSource::User => "user",
        FeedbackSource::Admin => "admin",
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    async fn find_for_message(
        &self,
        message_id: &MessageId,
        end_user_id: &EndUserId,
    ) -> Result<Option<MessageFeedback>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, app_id, conversation_id, message_id, from_end_user_id,
                   rating, content, from_source, created_at, updated_at
            FROM message_feedbacks
            WHERE message_id = $1 AND from_end_user_id = $2
            "#,
        )
        .bind(message_id.as_uuid())
        .bind(end_user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch feedback: {}", e)))?;

        row.as_ref().map(row_to_feedback).transpose()
    }

    async fn insert(&self, feedback: &MessageFeedback) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO message_feedbacks (
                id, app_id, conversation_id, message_id, from_end_user_id,
                rating, content, from_source, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(feedback.id.as_uuid())
        .bind(feedback.app_id.as_uuid())
        .bind(feedback.conversation_id.as_uuid())
        .bind(feedback.message_id.as_uuid())
        .bind(feedback.from_end_user_id.as_uuid())
        .bind(feedback.rating.as_str())
        .bind(&feedback.content)
        .bind(source_to_str(feedback.from_source))
        .bind(feedback.created_at.as_datetime())
        .bind(feedback.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert feedback: {}", e)))?;

        Ok(())
    }

    async fn update(&self, feedback: &MessageFeedback) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE message_feedbacks SET
                rating = $2,
                content = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(feedback.id.as_uuid())
        .bind(feedback.rating.as_str())
        .bind(&feedback.content)
        .bind(feedback.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update feedback: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::database(format!(
                "Feedback {} vanished during update",
                feedback.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &FeedbackId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM message_feedbacks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete feedback: {}", e)))?;

        Ok(())
    }

    async fn page_for_app(
        &self,
        app_id: &AppId,
        page: u32,
        limit: u32,
    ) -> Result<Vec<MessageFeedback>, DomainError> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        let rows = sqlx::query(
            r#"
            SELECT id, app_id, conversation_id, message_id, from_end_user_id,
                   rating, content, from_source, created_at, updated_at
            FROM message_feedbacks
            WHERE app_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(app_id.as_uuid())
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to page feedback: {}", e)))?;

        rows.iter().map(row_to_feedback).collect()
    }
}
