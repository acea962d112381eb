//! DTOs and field projections for the service API.
//!
//! Response shapes are part of the public contract and decoupled from
//! the domain types. Projection is done by explicit conversion functions
//! rather than declarative field maps, so every exposed field is visible
//! here.

use serde::{Deserialize, Serialize};

use crate::domain::message::{
    AgentThought, FileBelongsTo, Message, MessageFeedback, MessageFile, RetrieverResource,
};

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Public projection of a message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: String,
    pub conversation_id: String,
    pub parent_message_id: Option<String>,
    pub inputs: serde_json::Value,
    pub query: String,
    pub answer: String,
    pub message_files: Vec<MessageFileView>,
    pub feedback: Option<FeedbackView>,
    pub retriever_resources: Vec<RetrieverResource>,
    /// Unix seconds.
    pub created_at: u64,
    pub agent_thoughts: Vec<AgentThoughtView>,
    pub status: String,
    pub error: Option<String>,
}

/// Public projection of an attached file.
#[derive(Debug, Clone, Serialize)]
pub struct MessageFileView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub belongs_to: String,
}

/// Public projection of the caller's feedback on a message.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackView {
    pub rating: String,
}

/// Public projection of an agent reasoning step.
#[derive(Debug, Clone, Serialize)]
pub struct AgentThoughtView {
    pub id: String,
    pub message_id: String,
    pub position: u32,
    pub thought: Option<String>,
    pub tool: Option<String>,
    pub tool_input: Option<String>,
    pub observation: Option<String>,
    /// Unix seconds.
    pub created_at: u64,
}

/// Envelope for the message listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MessageListEnvelope {
    pub limit: u32,
    pub has_more: bool,
    pub data: Vec<MessageView>,
}

/// Envelope for the app feedback listing endpoint.
///
/// The stored feedback records pass through without projection.
#[derive(Debug, Clone, Serialize)]
pub struct AppFeedbacksEnvelope {
    pub data: Vec<MessageFeedback>,
}

/// `{"result": "success"}` acknowledgment.
#[derive(Debug, Clone, Serialize)]
pub struct ResultResponse {
    pub result: &'static str,
}

impl ResultResponse {
    pub fn success() -> Self {
        Self { result: "success" }
    }
}

/// Envelope for the suggested questions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestedQuestionsEnvelope {
    pub result: &'static str,
    pub data: Vec<String>,
}

impl SuggestedQuestionsEnvelope {
    pub fn success(data: Vec<String>) -> Self {
        Self {
            result: "success",
            data,
        }
    }
}

/// Response for the audio transcription endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query parameters for the message listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListMessagesParams {
    pub conversation_id: String,
    pub first_id: Option<String>,
    pub limit: Option<u32>,
    pub user: Option<String>,
}

/// Body of the feedback submission endpoint.
///
/// An absent or null `rating` clears the caller's feedback.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub rating: Option<String>,
    pub content: Option<String>,
    pub user: Option<String>,
}

/// Query parameters for the app feedback listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AppFeedbacksParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query parameters for endpoints that only resolve the end user.
#[derive(Debug, Clone, Deserialize)]
pub struct EndUserParams {
    pub user: Option<String>,
}

/// Body of the speech synthesis endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TextToAudioRequest {
    pub message_id: Option<String>,
    pub text: Option<String>,
    pub voice: Option<String>,
    pub user: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Projections
// ════════════════════════════════════════════════════════════════════════════════

/// Projects a message into its public shape.
///
/// Retriever resources are pulled out of the raw metadata blob here;
/// signed URLs were already refreshed by the application handler.
pub fn message_to_view(message: &Message) -> MessageView {
    MessageView {
        id: message.id.to_string(),
        conversation_id: message.conversation_id.to_string(),
        parent_message_id: message.parent_message_id.map(|id| id.to_string()),
        inputs: message.inputs.clone(),
        query: message.query.clone(),
        answer: message.answer.clone(),
        message_files: message.message_files.iter().map(file_to_view).collect(),
        feedback: message.feedback.as_ref().map(feedback_to_view),
        retriever_resources: RetrieverResource::extract_from_metadata(
            message.message_metadata.as_deref(),
        ),
        created_at: message.created_at.as_unix_secs(),
        agent_thoughts: message.agent_thoughts.iter().map(thought_to_view).collect(),
        status: message.status.as_str().to_string(),
        error: message.error.clone(),
    }
}

fn file_to_view(file: &MessageFile) -> MessageFileView {
    MessageFileView {
        id: file.id.to_string(),
        kind: file.kind.clone(),
        url: file.url.clone(),
        belongs_to: match file.belongs_to {
            FileBelongsTo::User => "user".to_string(),
            FileBelongsTo::Assistant => "assistant".to_string(),
        },
    }
}

fn feedback_to_view(feedback: &MessageFeedback) -> FeedbackView {
    FeedbackView {
        rating: feedback.rating.as_str().to_string(),
    }
}

fn thought_to_view(thought: &AgentThought) -> AgentThoughtView {
    AgentThoughtView {
        id: thought.id.to_string(),
        message_id: thought.message_id.to_string(),
        position: thought.position,
        thought: thought.thought.clone(),
        tool: thought.tool.clone(),
        tool_input: thought.tool_input.clone(),
        observation: thought.observation.clone(),
        created_at: thought.created_at.as_unix_secs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{
        AppId, ConversationId, EndUserId, MessageId, Timestamp,
    };
    use crate::domain::message::FeedbackRating;
    use serde_json::json;

    fn test_message() -> Message {
        Message::new(ConversationId::new(), "what is the return policy?", "30 days.")
            .with_created_at(Timestamp::from_unix_secs(1_700_000_000))
    }

    mod message_view {
        use super::*;

        #[test]
        fn projects_core_fields() {
            let message = test_message();
            let view = message_to_view(&message);

            assert_eq!(view.id, message.id.to_string());
            assert_eq!(view.conversation_id, message.conversation_id.to_string());
            assert_eq!(view.query, "what is the return policy?");
            assert_eq!(view.answer, "30 days.");
            assert_eq!(view.created_at, 1_700_000_000);
            assert_eq!(view.status, "normal");
            assert!(view.parent_message_id.is_none());
            assert!(view.error.is_none());
        }

        #[test]
        fn extracts_retriever_resources_from_metadata() {
            let metadata = json!({
                "retriever_resources": [{"position": 1, "dataset_name": "faq"}]
            })
            .to_string();
            let message = test_message().with_metadata(metadata);
            let view = message_to_view(&message);

            assert_eq!(view.retriever_resources.len(), 1);
            assert_eq!(view.retriever_resources[0].dataset_name.as_deref(), Some("faq"));
        }

        #[test]
        fn empty_metadata_projects_empty_resources() {
            let view = message_to_view(&test_message());
            assert!(view.retriever_resources.is_empty());
        }

        #[test]
        fn projects_feedback_rating_only() {
            let mut message = test_message();
            message.feedback = Some(MessageFeedback::from_end_user(
                AppId::new(),
                message.conversation_id,
                message.id,
                EndUserId::new(),
                FeedbackRating::Like,
                Some("secret notes".to_string()),
            ));
            let view = message_to_view(&message);

            let json = serde_json::to_value(&view).unwrap();
            assert_eq!(json["feedback"]["rating"], "like");
            // Free-text content stays private to the feedback listing.
            assert!(json["feedback"].get("content").is_none());
        }

        #[test]
        fn projects_files_with_type_key() {
            let mut message = test_message();
            message.message_files.push(MessageFile::new(
                "image",
                "/files/abc/preview",
                FileBelongsTo::Assistant,
            ));
            let json = serde_json::to_value(message_to_view(&message)).unwrap();

            assert_eq!(json["message_files"][0]["type"], "image");
            assert_eq!(json["message_files"][0]["belongs_to"], "assistant");
        }

        #[test]
        fn projects_agent_thoughts_in_order() {
            let mut message = test_message();
            message.agent_thoughts = vec![
                AgentThought::new(message.id, 1, "check stock"),
                AgentThought::new(message.id, 2, "compose answer")
                    .with_tool("inventory", "{}")
                    .with_observation("in stock"),
            ];
            let view = message_to_view(&message);

            assert_eq!(view.agent_thoughts.len(), 2);
            assert_eq!(view.agent_thoughts[0].position, 1);
            assert_eq!(view.agent_thoughts[1].tool.as_deref(), Some("inventory"));
        }
    }

    mod envelopes {
        use super::*;

        #[test]
        fn result_response_serializes_success() {
            let json = serde_json::to_value(ResultResponse::success()).unwrap();
            assert_eq!(json, json!({"result": "success"}));
        }

        #[test]
        fn suggested_questions_envelope_shape() {
            let envelope =
                SuggestedQuestionsEnvelope::success(vec!["What about exchanges?".to_string()]);
            let json = serde_json::to_value(&envelope).unwrap();
            assert_eq!(json["result"], "success");
            assert_eq!(json["data"][0], "What about exchanges?");
        }

        #[test]
        fn message_list_envelope_shape() {
            let envelope = MessageListEnvelope {
                limit: 20,
                has_more: false,
                data: vec![message_to_view(&test_message())],
            };
            let json = serde_json::to_value(&envelope).unwrap();
            assert_eq!(json["limit"], 20);
            assert_eq!(json["has_more"], false);
            assert!(json["data"].is_array());
        }

        #[test]
        fn app_feedbacks_envelope_passes_records_through() {
            let feedback = MessageFeedback::from_end_user(
                AppId::new(),
                ConversationId::new(),
                MessageId::new(),
                EndUserId::new(),
                FeedbackRating::Dislike,
                Some("too vague".to_string()),
            );
            let envelope = AppFeedbacksEnvelope {
                data: vec![feedback],
            };
            let json = serde_json::to_value(&envelope).unwrap();
            // Raw passthrough keeps the full record, content included.
            assert_eq!(json["data"][0]["rating"], "dislike");
            assert_eq!(json["data"][0]["content"], "too vague");
            assert_eq!(json["data"][0]["from_source"], "user");
        }
    }

    mod requests {
        use super::*;

        #[test]
        fn feedback_request_treats_null_and_absent_rating_alike() {
            let with_null: FeedbackRequest =
                serde_json::from_str(r#"{"rating": null, "user": "u1"}"#).unwrap();
            assert!(with_null.rating.is_none());

            let absent: FeedbackRequest = serde_json::from_str(r#"{"user": "u1"}"#).unwrap();
            assert!(absent.rating.is_none());

            let with_value: FeedbackRequest =
                serde_json::from_str(r#"{"rating": "like", "user": "u1"}"#).unwrap();
            assert_eq!(with_value.rating.as_deref(), Some("like"));
        }

        #[test]
        fn list_params_deserialize_from_query_shape() {
            let params: ListMessagesParams = serde_json::from_value(json!({
                "conversation_id": "b3c5a1de-8a24-4cb1-8a97-8a24b1de5c5a",
                "limit": 50
            }))
            .unwrap();
            assert_eq!(params.limit, Some(50));
            assert!(params.first_id.is_none());
            assert!(params.user.is_none());
        }
    }
}
