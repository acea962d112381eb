//! SubmitFeedbackHandler - record or clear an end user's message feedback.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, EndUser, ErrorCode, MessageId, ServiceApp};
use crate::domain::message::{FeedbackRating, MessageFeedback};
use crate::ports::{FeedbackRepository, MessageReader};

/// Command to submit feedback on a message.
///
/// A `None` rating clears the caller's existing feedback.
#[derive(Debug, Clone)]
pub struct SubmitFeedbackCommand {
    pub message_id: MessageId,
    pub rating: Option<FeedbackRating>,
    pub content: Option<String>,
}

/// Handler for the feedback submission operation.
pub struct SubmitFeedbackHandler {
    messages: Arc<dyn MessageReader>,
    feedbacks: Arc<dyn FeedbackRepository>,
}

impl SubmitFeedbackHandler {
    pub fn new(messages: Arc<dyn MessageReader>, feedbacks: Arc<dyn FeedbackRepository>) -> Self {
        Self {
            messages,
            feedbacks,
        }
    }

    pub async fn handle(
        &self,
        app: &ServiceApp,
        end_user: &EndUser,
        command: SubmitFeedbackCommand,
    ) -> Result<(), DomainError> {
        let message = self
            .messages
            .get_for_user(&app.id, &end_user.id, &command.message_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::MessageNotFound, "Message Not Exists."))?;

        let existing = self
            .feedbacks
            .find_for_message(&message.id, &end_user.id)
            .await?;

        match (command.rating, existing) {
            (Some(rating), Some(mut feedback)) => {
                feedback.revise(rating, command.content);
                self.feedbacks.update(&feedback).await?;
            }
            (Some(rating), None) => {
                let feedback = MessageFeedback::from_end_user(
                    app.id,
                    message.conversation_id,
                    message.id,
                    end_user.id,
                    rating,
                    command.content,
                );
                self.feedbacks.insert(&feedback).await?;
            }
            (None, Some(feedback)) => {
                self.feedbacks.delete(&feedback.id).await?;
            }
            (None, None) => {
                return Err(DomainError::new(
                    ErrorCode::InvalidRequest,
                    "Rating cannot be null when no feedback exists.",
                ));
            }
        }

        tracing::debug!(
            app_id = %app.id,
            message_id = %command.message_id,
            rating = ?command.rating,
            "Recorded message feedback"
        );

        Ok(())
    }
}
