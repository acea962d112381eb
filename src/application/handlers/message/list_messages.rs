//! ListMessagesHandler - backward cursor pagination over a conversation.

use std::sync::Arc;

use crate::domain::foundation::{
    ConversationId, DomainError, EndUser, ErrorCode, MessageId, ServiceApp,
};
use crate::domain::message::Message;
use crate::ports::{
    resign_embedded_urls, resign_inputs, ConversationReader, FileUrlSigner, MessageCursor,
    MessageReader,
};

/// Query to list messages of a conversation.
#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub conversation_id: ConversationId,

    /// Cursor for "load older messages": only messages created before
    /// this one are returned.
    pub first_id: Option<MessageId>,

    pub limit: u32,
}

/// One page of messages, oldest first.
#[derive(Debug)]
pub struct MessagePage {
    pub limit: u32,
    pub has_more: bool,
    pub data: Vec<Message>,
}

/// Handler for the message listing operation.
pub struct ListMessagesHandler {
    conversations: Arc<dyn ConversationReader>,
    messages: Arc<dyn MessageReader>,
    signer: Arc<dyn FileUrlSigner>,
}

impl ListMessagesHandler {
    pub fn new(
        conversations: Arc<dyn ConversationReader>,
        messages: Arc<dyn MessageReader>,
        signer: Arc<dyn FileUrlSigner>,
    ) -> Self {
        Self {
            conversations,
            messages,
            signer,
        }
    }

    pub async fn handle(
        &self,
        app: &ServiceApp,
        end_user: &EndUser,
        query: ListMessagesQuery,
    ) -> Result<MessagePage, DomainError> {
        let conversation = self
            .conversations
            .get_for_user(&app.id, &end_user.id, &query.conversation_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ConversationNotFound, "Conversation Not Exists.")
            })?;

        let cursor = match &query.first_id {
            Some(first_id) => {
                let first = self
                    .messages
                    .get_in_conversation(&conversation.id, first_id)
                    .await?
                    .ok_or_else(|| {
                        DomainError::new(
                            ErrorCode::FirstMessageNotFound,
                            "First Message Not Exists.",
                        )
                    })?;
                Some(MessageCursor::at(&first))
            }
            None => None,
        };

        // Newest first from the reader; the page is reversed below.
        let mut page = self
            .messages
            .list_before(&conversation.id, &end_user.id, cursor.as_ref(), query.limit)
            .await?;

        // A full page may be the exact tail of the history, so check
        // whether anything older than the page remains.
        let has_more = match page.last() {
            Some(oldest) if page.len() == query.limit as usize => {
                self.messages
                    .count_before(&conversation.id, &MessageCursor::at(oldest))
                    .await?
                    > 0
            }
            _ => false,
        };

        page.reverse();

        for message in &mut page {
            self.refresh_signed_urls(message);
        }

        tracing::debug!(
            app_id = %app.id,
            conversation_id = %conversation.id,
            count = page.len(),
            has_more,
            "Listed conversation messages"
        );

        Ok(MessagePage {
            limit: query.limit,
            has_more,
            data: page,
        })
    }

    /// Signed file URLs expire; refresh every one embedded in the payload.
    fn refresh_signed_urls(&self, message: &mut Message) {
        let signer = self.signer.as_ref();
        message.answer = resign_embedded_urls(&message.answer, signer);
        message.inputs = resign_inputs(&message.inputs, signer);
        for file in &mut message.message_files {
            if let Some(refreshed) = signer.refresh(&file.url) {
                file.url = refreshed;
            }
        }
    }
}
