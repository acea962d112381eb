//! Conversation reader port (read side).

use async_trait::async_trait;

use crate::domain::foundation::{AppId, ConversationId, DomainError, EndUserId};
use crate::domain::message::Conversation;

/// Reader port for conversation scoping queries.
#[async_trait]
pub trait ConversationReader: Send + Sync {
    /// Get a conversation belonging to the given app and end user.
    ///
    /// Returns `None` when the conversation does not exist or is owned by
    /// a different app or end user.
    async fn get_for_user(
        &self,
        app_id: &AppId,
        end_user_id: &EndUserId,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, DomainError>;
}
