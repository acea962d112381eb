//! Conversation read view.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AppId, ConversationId, EndUserId, Timestamp};

/// A conversation as the service API sees it.
///
/// Conversations are created by the chat pipeline; this layer only ever
/// reads them to scope message queries to the right app and end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub app_id: AppId,
    pub from_end_user_id: Option<EndUserId>,
    pub name: String,
    pub created_at: Timestamp,
}

impl Conversation {
    /// Creates a conversation view.
    pub fn new(
        id: ConversationId,
        app_id: AppId,
        from_end_user_id: Option<EndUserId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            app_id,
            from_end_user_id,
            name: name.into(),
            created_at: Timestamp::now(),
        }
    }

    /// Returns true when the conversation belongs to the given end user.
    pub fn belongs_to(&self, end_user_id: &EndUserId) -> bool {
        self.from_end_user_id.as_ref() == Some(end_user_id)
    }
}
