//! Message reader port (read side).
//!
//! Defines the contract for message lookup and backward cursor
//! pagination over a conversation's history.

use async_trait::async_trait;

use crate::domain::foundation::{AppId, ConversationId, DomainError, EndUserId, MessageId, Timestamp};
use crate::domain::message::Message;

/// Pagination cursor pointing at a message.
///
/// Pages run backwards in time: a cursor selects messages created
/// strictly before `created_at`, excluding the cursor message itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCursor {
    pub created_at: Timestamp,
    pub id: MessageId,
}

impl MessageCursor {
    /// Builds a cursor pointing at the given message.
    pub fn at(message: &Message) -> Self {
        Self {
            created_at: message.created_at,
            id: message.id,
        }
    }
}

/// Reader port for message queries.
///
/// Implementations populate each message's `feedback` field with the
/// requesting end user's feedback, when one exists.
#[async_trait]
pub trait MessageReader: Send + Sync {
    /// Get a message owned by the given end user within an app.
    ///
    /// Returns `None` when the message does not exist, belongs to another
    /// app, or was not sent by this end user.
    async fn get_for_user(
        &self,
        app_id: &AppId,
        end_user_id: &EndUserId,
        message_id: &MessageId,
    ) -> Result<Option<Message>, DomainError>;

    /// Get a message by id within a conversation, regardless of owner.
    ///
    /// Used to resolve the `first_id` pagination cursor.
    async fn get_in_conversation(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<Option<Message>, DomainError>;

    /// List up to `limit` messages of a conversation, newest first.
    ///
    /// With a cursor, only messages created strictly before it are
    /// returned. Feedback is populated for the given end user.
    async fn list_before(
        &self,
        conversation_id: &ConversationId,
        end_user_id: &EndUserId,
        before: Option<&MessageCursor>,
        limit: u32,
    ) -> Result<Vec<Message>, DomainError>;

    /// Count messages of a conversation created strictly before the cursor.
    async fn count_before(
        &self,
        conversation_id: &ConversationId,
        cursor: &MessageCursor,
    ) -> Result<u64, DomainError>;
}
