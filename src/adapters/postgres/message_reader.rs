//! PostgreSQL implementation of MessageReader.
//!
//! Reads messages with their satellite records (files, agent thoughts,
//! and the requesting end user's feedback).

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    AppId, ConversationId, DomainError, EndUserId, FeedbackId, MessageId, Timestamp,
};
use crate::domain::message::{
    AgentThought, FeedbackRating, FeedbackSource, FileBelongsTo, Message, MessageFeedback,
    MessageFile, MessageStatus,
};
use crate::ports::{MessageCursor, MessageReader};

/// PostgreSQL implementation of MessageReader.
#[derive(Clone)]
pub struct PostgresMessageReader {
    pool: PgPool,
}

impl PostgresMessageReader {
    /// Creates a new PostgresMessageReader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_satellites(
        &self,
        message: &mut Message,
        end_user_id: Option<&EndUserId>,
    ) -> Result<(), DomainError> {
        let file_rows = sqlx::query(
            r#"
            SELECT id, kind, url, belongs_to
            FROM message_files
            WHERE message_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(message.id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch message files: {}", e)))?;

        message.message_files = file_rows
            .iter()
            .map(row_to_file)
            .collect::<Result<Vec<_>, _>>()?;

        let thought_rows = sqlx::query(
            r#"
            SELECT id, message_id, position, thought, tool, tool_input, observation, created_at
            FROM message_agent_thoughts
            WHERE message_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(message.id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch agent thoughts: {}", e)))?;

        message.agent_thoughts = thought_rows.iter().map(row_to_thought).collect();

        if let Some(end_user_id) = end_user_id {
            let feedback_row = sqlx::query(
                r#"
                SELECT id, app_id, conversation_id, message_id, from_end_user_id,
                       rating, content, from_source, created_at, updated_at
                FROM message_feedbacks
                WHERE message_id = $1 AND from_end_user_id = $2
                "#,
            )
            .bind(message.id.as_uuid())
            .bind(end_user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch feedback: {}", e)))?;

            message.feedback = feedback_row.as_ref().map(row_to_feedback).transpose()?;
        }

        Ok(())
    }
}

#[async_trait]
impl MessageReader for PostgresMessageReader {
    async fn get_for_user(
        &self,
        app_id: &AppId,
        end_user_id: &EndUserId,
        message_id: &MessageId,
    ) -> Result<Option<Message>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, conversation_id, parent_message_id, inputs, query, answer,
                   message_metadata, status, error, created_at
            FROM messages
            WHERE id = $1 AND app_id = $2 AND from_end_user_id = $3
            "#,
        )
        .bind(message_id.as_uuid())
        .bind(app_id.as_uuid())
        .bind(end_user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch message: {}", e)))?;

        match row {
            Some(row) => {
                let mut message = row_to_message(&row)?;
                self.load_satellites(&mut message, Some(end_user_id)).await?;
                Ok(Some(message))
            }
            None => Ok(None),
        }
    }

    async fn get_in_conversation(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<Option<Message>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, conversation_id, parent_message_id, inputs, query, answer,
                   message_metadata, status, error, created_at
            FROM messages
            WHERE id = $1 AND conversation_id = $2
            "#,
        )
        .bind(message_id.as_uuid())
        .bind(conversation_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch cursor message: {}", e)))?;

        // Cursor resolution does not need files or feedback.
        row.as_ref().map(row_to_message).transpose()
    }

    async fn list_before(
        &self,
        conversation_id: &ConversationId,
        end_user_id: &EndUserId,
        before: Option<&MessageCursor>,
        limit: u32,
    ) -> Result<Vec<Message>, DomainError> {
        let rows = match before {
            Some(cursor) => {
                sqlx::query(
                    r#"
                    SELECT id, conversation_id, parent_message_id, inputs, query, answer,
                           message_metadata, status, error, created_at
                    FROM messages
                    WHERE conversation_id = $1
                      AND created_at < $2
                      AND id <> $3
                    ORDER BY created_at DESC
                    LIMIT $4
                    "#,
                )
                .bind(conversation_id.as_uuid())
                .bind(cursor.created_at.as_datetime())
                .bind(cursor.id.as_uuid())
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, conversation_id, parent_message_id, inputs, query, answer,
                           message_metadata, status, error, created_at
                    FROM messages
                    WHERE conversation_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2
                    "#,
                )
                .bind(conversation_id.as_uuid())
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::database(format!("Failed to list messages: {}", e)))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut message = row_to_message(row)?;
            self.load_satellites(&mut message, Some(end_user_id)).await?;
            messages.push(message);
        }
        Ok(messages)
    }

    async fn count_before(
        &self,
        conversation_id: &ConversationId,
        cursor: &MessageCursor,
    ) -> Result<u64, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS remaining
            FROM messages
            WHERE conversation_id = $1
              AND created_at < $2
              AND id <> $3
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(cursor.created_at.as_datetime())
        .bind(cursor.id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to count messages: {}", e)))?;

        let remaining: i64 = row.get("remaining");
        Ok(remaining as u64)
    }
}

fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
    let status: String = row.get("status");
    let status: MessageStatus = status
        .parse()
        .map_err(|e| DomainError::database(format!("Corrupt message status: {}", e)))?;

    // Inputs are an opaque blob from the pipeline; an unreadable value
    // degrades to an empty object instead of failing the listing.
    let inputs: Option<String> = row.get("inputs");
    let inputs = inputs
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    Ok(Message {
        id: MessageId::from_uuid(row.get("id")),
        conversation_id: ConversationId::from_uuid(row.get("conversation_id")),
        parent_message_id: row
            .get::<Option<uuid::Uuid>, _>("parent_message_id")
            .map(MessageId::from_uuid),
        inputs,
        query: row.get("query"),
        answer: row.get("answer"),
        message_files: Vec::new(),
        feedback: None,
        message_metadata: row.get("message_metadata"),
        status,
        error: row.get("error"),
        agent_thoughts: Vec::new(),
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_file(row: &PgRow) -> Result<MessageFile, DomainError> {
    let belongs_to: String = row.get("belongs_to");
    let belongs_to = match belongs_to.as_str() {
        "user" => FileBelongsTo::User,
        "assistant" => FileBelongsTo::Assistant,
        other => {
            return Err(DomainError::database(format!(
                "Corrupt file ownership '{}'",
                other
            )))
        }
    };

    Ok(MessageFile {
        id: row.get("id"),
        kind: row.get("kind"),
        url: row.get("url"),
        belongs_to,
    })
}

fn row_to_thought(row: &PgRow) -> AgentThought {
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    AgentThought {
        id: row.get("id"),
        message_id: MessageId::from_uuid(row.get("message_id")),
        position: row.get::<i32, _>("position") as u32,
        thought: row.get("thought"),
        tool: row.get("tool"),
        tool_input: row.get("tool_input"),
        observation: row.get("observation"),
        created_at: Timestamp::from_datetime(created_at),
    }
}

pub(super) fn row_to_feedback(row: &PgRow) -> Result<MessageFeedback, DomainError> {
    let rating: String = row.get("rating");
    let rating: FeedbackRating = rating
        .parse()
        .map_err(|e| DomainError::database(format!("Corrupt feedback rating: {}", e)))?;

    let from_source: String = row.get("from_source");
    let from_source = match from_source.as_str() {
        "user" => FeedbackSource::User,
        "admin" => FeedbackSource::Admin,
        other => {
            return Err(DomainError::database(format!(
                "Corrupt feedback source '{}'",
                other
            )))
        }
    };

    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    Ok(MessageFeedback {
        id: FeedbackId::from_uuid(row.get("id")),
        app_id: AppId::from_uuid(row.get("app_id")),
        conversation_id: ConversationId::from_uuid(row.get("conversation_id")),
        message_id: MessageId::from_uuid(row.get("message_id")),
        from_end_user_id: EndUserId::from_uuid(row.get("from_end_user_id")),
        rating,
        content: row.get("content"),
        from_source,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
