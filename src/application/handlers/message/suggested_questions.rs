//! SuggestedQuestionsHandler - follow-up questions after an answer.

use std::sync::Arc;

use crate::domain::foundation::{
    DomainError, EndUser, ErrorCode, InvokeFrom, MessageId, ServiceApp,
};
use crate::ports::{
    AiError, HistoryTurn, MessageCursor, MessageReader, SuggestionContext, SuggestionGenerator,
};

/// Number of completed exchanges handed to the generator as context.
const HISTORY_TURNS: u32 = 10;

/// Handler for the suggested-questions operation.
pub struct SuggestedQuestionsHandler {
    messages: Arc<dyn MessageReader>,
    generator: Arc<dyn SuggestionGenerator>,
}

impl SuggestedQuestionsHandler {
    pub fn new(messages: Arc<dyn MessageReader>, generator: Arc<dyn SuggestionGenerator>) -> Self {
        Self {
            messages,
            generator,
        }
    }

    pub async fn handle(
        &self,
        app: &ServiceApp,
        end_user: &EndUser,
        message_id: MessageId,
        invoke_from: InvokeFrom,
    ) -> Result<Vec<String>, DomainError> {
        let message = self
            .messages
            .get_for_user(&app.id, &end_user.id, &message_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::MessageNotFound, "Message Not Exists."))?;

        if !app.features.suggested_questions_after_answer {
            return Err(DomainError::new(
                ErrorCode::SuggestedQuestionsDisabled,
                "Suggested Questions Is Disabled.",
            ));
        }

        // Bounded context window ending at the message being followed up on.
        let mut recent = self
            .messages
            .list_before(
                &message.conversation_id,
                &end_user.id,
                Some(&MessageCursor::at(&message)),
                HISTORY_TURNS - 1,
            )
            .await?;
        recent.reverse();
        recent.push(message);

        let context = SuggestionContext {
            history: recent
                .iter()
                .map(|m| HistoryTurn {
                    query: m.query.clone(),
                    answer: m.answer.clone(),
                })
                .collect(),
            invoke_from,
            end_user: end_user.external_id.clone(),
        };

        let questions = self
            .generator
            .suggest(&context)
            .await
            .map_err(|e| match e {
                AiError::RateLimited { .. } => {
                    DomainError::new(ErrorCode::RateLimited, "AI provider rate limited the request")
                }
                other => DomainError::provider(other.to_string()),
            })?;

        tracing::debug!(
            app_id = %app.id,
            message_id = %message_id,
            invoke_from = %invoke_from,
            count = questions.len(),
            "Generated suggested questions"
        );

        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{
        AppFeatures, AppId, AppMode, ConversationId, EndUserId, TenantId, Timestamp,
    };
    use crate::domain::message::Message;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockMessageReader {
        messages: Vec<Message>,
    }

    #[async_trait]
    impl MessageReader for MockMessageReader {
        async fn get_for_user(
            &self,
            _app_id: &AppId,
            _end_user_id: &EndUserId,
            message_id: &MessageId,
        ) -> Result<Option<Message>, DomainError> {
            Ok(self.messages.iter().find(|m| m.id == *message_id).cloned())
        }

        async fn get_in_conversation(
            &self,
            _conversation_id: &ConversationId,
            message_id: &MessageId,
        ) -> Result<Option<Message>, DomainError> {
            Ok(self.messages.iter().find(|m| m.id == *message_id).cloned())
        }

        async fn list_before(
            &self,
            _conversation_id: &ConversationId,
            _end_user_id: &EndUserId,
            before: Option<&MessageCursor>,
            limit: u32,
        ) -> Result<Vec<Message>, DomainError> {
            let mut older: Vec<Message> = self
                .messages
                .iter()
                .filter(|m| match before {
                    Some(cursor) => m.created_at < cursor.created_at && m.id != cursor.id,
                    None => true,
                })
                .cloned()
                .collect();
            older.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            older.truncate(limit as usize);
            Ok(older)
        }

        async fn count_before(
            &self,
            _conversation_id: &ConversationId,
            _cursor: &MessageCursor,
        ) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    struct MockGenerator {
        result: Result<Vec<String>, AiError>,
        seen_context: Mutex<Option<SuggestionContext>>,
    }

    impl MockGenerator {
        fn with_questions(questions: Vec<&str>) -> Self {
            Self {
                result: Ok(questions.into_iter().map(String::from).collect()),
                seen_context: Mutex::new(None),
            }
        }

        fn failing(error: AiError) -> Self {
            Self {
                result: Err(error),
                seen_context: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl SuggestionGenerator for MockGenerator {
        async fn suggest(&self, context: &SuggestionContext) -> Result<Vec<String>, AiError> {
            *self.seen_context.lock().unwrap() = Some(context.clone());
            self.result.clone()
        }
    }

    fn app_with_suggestions(enabled: bool) -> ServiceApp {
        ServiceApp::new(
            AppId::new(),
            TenantId::new(),
            "Support Bot",
            AppMode::Chat,
            AppFeatures {
                suggested_questions_after_answer: enabled,
                ..Default::default()
            },
        )
    }

    fn message_at(conversation_id: ConversationId, secs: u64, text: &str) -> Message {
        Message::new(conversation_id, text, format!("re: {}", text))
            .with_created_at(Timestamp::from_unix_secs(secs))
    }

    #[tokio::test]
    async fn missing_message_yields_not_found() {
        let handler = SuggestedQuestionsHandler::new(
            Arc::new(MockMessageReader { messages: vec![] }),
            Arc::new(MockGenerator::with_questions(vec!["next?"])),
        );
        let app = app_with_suggestions(true);

        let err = handler
            .handle(
                &app,
                &EndUser::identified(app.id, "u1"),
                MessageId::new(),
                InvokeFrom::ServiceApi,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MessageNotFound);
    }

    #[tokio::test]
    async fn disabled_feature_short_circuits_before_generation() {
        let conversation_id = ConversationId::new();
        let message = message_at(conversation_id, 100, "hello");
        let generator = Arc::new(MockGenerator::with_questions(vec!["next?"]));
        let handler = SuggestedQuestionsHandler::new(
            Arc::new(MockMessageReader {
                messages: vec![message.clone()],
            }),
            generator.clone(),
        );
        let app = app_with_suggestions(false);

        let err = handler
            .handle(
                &app,
                &EndUser::identified(app.id, "u1"),
                message.id,
                InvokeFrom::ServiceApi,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SuggestedQuestionsDisabled);
        assert!(generator.seen_context.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn history_ends_at_target_message_and_is_tagged() {
        let conversation_id = ConversationId::new();
        let messages = vec![
            message_at(conversation_id, 100, "first"),
            message_at(conversation_id, 200, "second"),
            message_at(conversation_id, 300, "third"),
        ];
        let target = messages[1].clone(); // "second"
        let generator = Arc::new(MockGenerator::with_questions(vec!["and then?"]));
        let handler = SuggestedQuestionsHandler::new(
            Arc::new(MockMessageReader { messages }),
            generator.clone(),
        );
        let app = app_with_suggestions(true);

        let questions = handler
            .handle(
                &app,
                &EndUser::identified(app.id, "u1"),
                target.id,
                InvokeFrom::ServiceApi,
            )
            .await
            .unwrap();
        assert_eq!(questions, vec!["and then?".to_string()]);

        let context = generator.seen_context.lock().unwrap().clone().unwrap();
        assert_eq!(context.invoke_from, InvokeFrom::ServiceApi);
        assert_eq!(context.end_user, "u1");
        // Oldest first, ending at the target; "third" is newer and excluded.
        assert_eq!(context.history.len(), 2);
        assert_eq!(context.history[0].query, "first");
        assert_eq!(context.history[1].query, "second");
    }

    #[tokio::test]
    async fn provider_failure_maps_to_provider_error() {
        let conversation_id = ConversationId::new();
        let message = message_at(conversation_id, 100, "hello");
        let handler = SuggestedQuestionsHandler::new(
            Arc::new(MockMessageReader {
                messages: vec![message.clone()],
            }),
            Arc::new(MockGenerator::failing(AiError::network("boom"))),
        );
        let app = app_with_suggestions(true);

        let err = handler
            .handle(
                &app,
                &EndUser::identified(app.id, "u1"),
                message.id,
                InvokeFrom::ServiceApi,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProviderError);
    }

    #[tokio::test]
    async fn provider_rate_limit_maps_to_rate_limited() {
        let conversation_id = ConversationId::new();
        let message = message_at(conversation_id, 100, "hello");
        let handler = SuggestedQuestionsHandler::new(
            Arc::new(MockMessageReader {
                messages: vec![message.clone()],
            }),
            Arc::new(MockGenerator::failing(AiError::RateLimited {
                retry_after_secs: Some(30),
            })),
        );
        let app = app_with_suggestions(true);

        let err = handler
            .handle(
                &app,
                &EndUser::identified(app.id, "u1"),
                message.id,
                InvokeFrom::ServiceApi,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::RateLimited);
    }
}
