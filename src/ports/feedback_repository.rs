//! Feedback repository port.

use async_trait::async_trait;

use crate::domain::foundation::{AppId, DomainError, EndUserId, FeedbackId, MessageId};
use crate::domain::message::MessageFeedback;

/// Repository port for message feedback.
///
/// At most one feedback exists per (message, end user) pair; the
/// application layer decides between insert, update, and delete.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Find the feedback an end user left on a message.
    async fn find_for_message(
        &self,
        message_id: &MessageId,
        end_user_id: &EndUserId,
    ) -> Result<Option<MessageFeedback>, DomainError>;

    /// Insert a new feedback record.
    async fn insert(&self, feedback: &MessageFeedback) -> Result<(), DomainError>;

    /// Update an existing feedback record (rating, content, updated_at).
    async fn update(&self, feedback: &MessageFeedback) -> Result<(), DomainError>;

    /// Delete a feedback record.
    async fn delete(&self, id: &FeedbackId) -> Result<(), DomainError>;

    /// Page through all feedback of an app, newest first.
    ///
    /// `page` is 1-based; `limit` is the page size.
    async fn page_for_app(
        &self,
        app_id: &AppId,
        page: u32,
        limit: u32,
    ) -> Result<Vec<MessageFeedback>, DomainError>;
}
