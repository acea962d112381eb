//! Integration tests for the service API HTTP surface.
//!
//! Wires the full router against in-memory port implementations and
//! drives it with tower `oneshot` requests: token rejection, parameter
//! validation, the four message endpoints, and the audio endpoints.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use parlance::adapters::ai::{MockSpeechProvider, MockSuggestionGenerator};
use parlance::adapters::auth::MockTokenValidator;
use parlance::adapters::http::middleware::ServiceAuthState;
use parlance::adapters::http::service_api::{service_api_router, ServiceApiState};
use parlance::application::handlers::audio::{SynthesizeSpeechHandler, TranscribeAudioHandler};
use parlance::application::handlers::message::{
    ListAppFeedbacksHandler, ListMessagesHandler, SubmitFeedbackHandler, SuggestedQuestionsHandler,
};
use parlance::domain::foundation::{
    AppFeatures, AppId, AppMode, ConversationId, DomainError, EndUser, EndUserId, FeedbackId,
    MessageId, ServiceApp, TenantId, Timestamp, TtsSettings,
};
use parlance::domain::message::{
    Conversation, FeedbackRating, Message, MessageFeedback,
};
use parlance::ports::{
    ConversationReader, EndUserStore, FeedbackRepository, FileUrlSigner, MessageCursor,
    MessageReader,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// End user store that derives deterministic ids from external ids.
struct InMemoryEndUserStore {
    users: Mutex<Vec<EndUser>>,
}

impl InMemoryEndUserStore {
    fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EndUserStore for InMemoryEndUserStore {
    async fn get_or_create(
        &self,
        app_id: &AppId,
        external_id: Option<&str>,
    ) -> Result<EndUser, DomainError> {
        let external = external_id.unwrap_or("DEFAULT-USER");
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users
            .iter()
            .find(|u| u.app_id == *app_id && u.external_id == external)
        {
            return Ok(user.clone());
        }
        let user = match external_id {
            Some(id) => EndUser::identified(*app_id, id),
            None => EndUser::anonymous(*app_id),
        };
        users.push(user.clone());
        Ok(user)
    }
}

struct InMemoryConversationReader {
    conversations: Vec<Conversation>,
}

#[async_trait]
impl ConversationReader for InMemoryConversationReader {
    async fn get_for_user(
        &self,
        app_id: &AppId,
        _end_user_id: &EndUserId,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, DomainError> {
        Ok(self
            .conversations
            .iter()
            .find(|c| c.id == *conversation_id && c.app_id == *app_id)
            .cloned())
    }
}

struct InMemoryMessageReader {
    messages: Vec<Message>,
}

#[async_trait]
impl MessageReader for InMemoryMessageReader {
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
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<Option<Message>, DomainError> {
        Ok(self
            .messages
            .iter()
            .find(|m| m.conversation_id == *conversation_id && m.id == *message_id)
            .cloned())
    }

    async fn list_before(
        &self,
        conversation_id: &ConversationId,
        _end_user_id: &EndUserId,
        before: Option<&MessageCursor>,
        limit: u32,
    ) -> Result<Vec<Message>, DomainError> {
        let mut matching: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .filter(|m| match before {
                Some(cursor) => m.created_at < cursor.created_at && m.id != cursor.id,
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn count_before(
        &self,
        conversation_id: &ConversationId,
        cursor: &MessageCursor,
    ) -> Result<u64, DomainError> {
        Ok(self
            .messages
            .iter()
            .filter(|m| {
                m.conversation_id == *conversation_id
                    && m.created_at < cursor.created_at
                    && m.id != cursor.id
            })
            .count() as u64)
    }
}

#[derive(Default)]
struct InMemoryFeedbackRepository {
    stored: Mutex<Vec<MessageFeedback>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn find_for_message(
        &self,
        message_id: &MessageId,
        end_user_id: &EndUserId,
    ) -> Result<Option<MessageFeedback>, DomainError> {
        Ok(self
            .stored
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.message_id == *message_id && f.from_end_user_id == *end_user_id)
            .cloned())
    }

    async fn insert(&self, feedback: &MessageFeedback) -> Result<(), DomainError> {
        self.stored.lock().unwrap().push(feedback.clone());
        Ok(())
    }

    async fn update(&self, feedback: &MessageFeedback) -> Result<(), DomainError> {
        let mut stored = self.stored.lock().unwrap();
        if let Some(pos) = stored.iter().position(|f| f.id == feedback.id) {
            stored[pos] = feedback.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &FeedbackId) -> Result<(), DomainError> {
        self.stored.lock().unwrap().retain(|f| f.id != *id);
        Ok(())
    }

    async fn page_for_app(
        &self,
        app_id: &AppId,
        _page: u32,
        limit: u32,
    ) -> Result<Vec<MessageFeedback>, DomainError> {
        Ok(self
            .stored
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.app_id == *app_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

struct NoopSigner;

impl FileUrlSigner for NoopSigner {
    fn sign(&self, path: &str) -> String {
        format!("http://files.test{}?sig=fresh", path)
    }

    fn refresh(&self, url: &str) -> Option<String> {
        let without_query = url.split('?').next()?;
        let path = without_query.strip_prefix("http://files.test")?;
        Some(self.sign(path))
    }

    fn files_prefix(&self) -> &str {
        "http://files.test/files/"
    }
}

const TOKEN: &str = "app-integration-token";

struct TestEnv {
    router: Router,
    conversation_id: ConversationId,
    messages: Vec<Message>,
    feedbacks: Arc<InMemoryFeedbackRepository>,
}

fn message_at(conversation_id: ConversationId, secs: u64, query: &str, answer: &str) -> Message {
    Message::new(conversation_id, query, answer)
        .with_created_at(Timestamp::from_unix_secs(secs))
}

fn build_env(mode: AppMode, features: AppFeatures) -> TestEnv {
    let app = ServiceApp::new(AppId::new(), TenantId::new(), "Support Bot", mode, features);
    let conversation = Conversation::new(ConversationId::new(), app.id, None, "Chat");
    let conversation_id = conversation.id;

    let metadata = json!({
        "retriever_resources": [
            {"position": 1, "dataset_name": "handbook", "content": "returns take 30 days"}
        ]
    })
    .to_string();

    let messages = vec![
        message_at(conversation_id, 100, "hi", "hello!"),
        message_at(conversation_id, 200, "return policy?", "30 days.").with_metadata(metadata),
        message_at(conversation_id, 300, "anything else?", "that covers it."),
    ];

    let feedbacks = Arc::new(InMemoryFeedbackRepository::default());
    let message_reader = Arc::new(InMemoryMessageReader {
        messages: messages.clone(),
    });
    let speech = Arc::new(MockSpeechProvider::new().with_transcript("play it back"));

    let state = ServiceApiState::new(
        Arc::new(InMemoryEndUserStore::new()),
        Arc::new(ListMessagesHandler::new(
            Arc::new(InMemoryConversationReader {
                conversations: vec![conversation],
            }),
            message_reader.clone(),
            Arc::new(NoopSigner),
        )),
        Arc::new(SubmitFeedbackHandler::new(
            message_reader.clone(),
            feedbacks.clone(),
        )),
        Arc::new(ListAppFeedbacksHandler::new(feedbacks.clone())),
        Arc::new(SuggestedQuestionsHandler::new(
            message_reader.clone(),
            Arc::new(MockSuggestionGenerator::with_questions(vec![
                "What about exchanges?",
                "Is shipping free?",
            ])),
        )),
        Arc::new(TranscribeAudioHandler::new(speech.clone())),
        Arc::new(SynthesizeSpeechHandler::new(message_reader, speech)),
    );

    let validator: ServiceAuthState = Arc::new(MockTokenValidator::new().with_app(TOKEN, app));
    let router = service_api_router(validator).with_state(state);

    TestEnv {
        router,
        conversation_id,
        messages,
        feedbacks,
    }
}

fn chat_env() -> TestEnv {
    build_env(
        AppMode::Chat,
        AppFeatures {
            suggested_questions_after_answer: true,
            speech_to_text: true,
            text_to_speech: TtsSettings {
                enabled: true,
                voice: Some("alloy".to_string()),
            },
        },
    )
}

fn get(uri: impl AsRef<str>) -> Request<Body> {
    Request::builder()
        .uri(uri.as_ref())
        .header("Authorization", format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: impl AsRef<str>, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri.as_ref())
        .header("Authorization", format!("Bearer {}", TOKEN))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn request_without_token_is_rejected() {
    let env = chat_env();
    let request = Request::builder()
        .uri(format!("/v1/messages?conversation_id={}", env.conversation_id))
        .body(Body::empty())
        .unwrap();

    let response = env.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn request_with_unknown_token_is_rejected() {
    let env = chat_env();
    let request = Request::builder()
        .uri("/v1/app/feedbacks")
        .header("Authorization", "Bearer wrong-token")
        .body(Body::empty())
        .unwrap();

    let response = env.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// GET /v1/messages
// =============================================================================

#[tokio::test]
async fn listing_returns_envelope_with_projected_messages() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(get(format!(
            "/v1/messages?conversation_id={}&user=u1",
            env.conversation_id
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["limit"], 20);
    assert_eq!(body["has_more"], false);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);

    // Oldest first.
    assert_eq!(data[0]["query"], "hi");
    assert_eq!(data[2]["query"], "anything else?");

    // Fixed public projection.
    let second = &data[1];
    assert_eq!(second["answer"], "30 days.");
    assert_eq!(second["status"], "normal");
    assert_eq!(second["created_at"], 200);
    assert_eq!(second["retriever_resources"][0]["dataset_name"], "handbook");
    assert!(second["error"].is_null());
    assert!(second.get("message_metadata").is_none());
}

#[tokio::test]
async fn listing_paginates_backwards_from_first_id() {
    let env = chat_env();
    let first_id = env.messages[2].id; // newest message as cursor
    let response = env
        .router
        .oneshot(get(format!(
            "/v1/messages?conversation_id={}&first_id={}&limit=1&user=u1",
            env.conversation_id, first_id
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["query"], "return policy?");
    assert_eq!(body["has_more"], true);
}

#[tokio::test]
async fn listing_rejects_out_of_range_limit() {
    let env = chat_env();
    for limit in ["0", "101"] {
        let response = env
            .router
            .clone()
            .oneshot(get(format!(
                "/v1/messages?conversation_id={}&limit={}",
                env.conversation_id, limit
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "limit={}", limit);
    }
}

#[tokio::test]
async fn listing_rejects_invalid_conversation_id() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(get("/v1/messages?conversation_id=not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_unknown_conversation_is_404() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(get(format!(
            "/v1/messages?conversation_id={}",
            ConversationId::new()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_unknown_first_id_is_404() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(get(format!(
            "/v1/messages?conversation_id={}&first_id={}",
            env.conversation_id,
            MessageId::new()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_chat_app_cannot_use_conversation_endpoints() {
    let env = build_env(AppMode::Workflow, AppFeatures::default());

    let response = env
        .router
        .clone()
        .oneshot(get(format!(
            "/v1/messages?conversation_id={}",
            env.conversation_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = env
        .router
        .oneshot(get(format!(
            "/v1/messages/{}/suggested?user=u1",
            env.messages[0].id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// POST /v1/messages/:message_id/feedbacks
// =============================================================================

#[tokio::test]
async fn feedback_round_trip_creates_and_clears() {
    let env = chat_env();
    let message_id = env.messages[1].id;

    // Like it.
    let response = env
        .router
        .clone()
        .oneshot(post_json(
            format!("/v1/messages/{}/feedbacks", message_id),
            json!({"rating": "like", "content": "clear answer", "user": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"result": "success"}));
    {
        let stored = env.feedbacks.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rating, FeedbackRating::Like);
    }

    // Change of heart.
    let response = env
        .router
        .clone()
        .oneshot(post_json(
            format!("/v1/messages/{}/feedbacks", message_id),
            json!({"rating": "dislike", "user": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    {
        let stored = env.feedbacks.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rating, FeedbackRating::Dislike);
    }

    // Retract it.
    let response = env
        .router
        .oneshot(post_json(
            format!("/v1/messages/{}/feedbacks", message_id),
            json!({"rating": null, "user": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(env.feedbacks.stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn feedback_on_unknown_message_is_404_not_500() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(post_json(
            format!("/v1/messages/{}/feedbacks", MessageId::new()),
            json!({"rating": "like", "user": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feedback_requires_a_user() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(post_json(
            format!("/v1/messages/{}/feedbacks", env.messages[0].id),
            json!({"rating": "like"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feedback_rejects_unknown_rating() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(post_json(
            format!("/v1/messages/{}/feedbacks", env.messages[0].id),
            json!({"rating": "meh", "user": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// GET /v1/app/feedbacks
// =============================================================================

#[tokio::test]
async fn app_feedbacks_returns_raw_records() {
    let env = chat_env();
    let message_id = env.messages[0].id;

    env.router
        .clone()
        .oneshot(post_json(
            format!("/v1/messages/{}/feedbacks", message_id),
            json!({"rating": "dislike", "content": "too short", "user": "u1"}),
        ))
        .await
        .unwrap();

    let response = env
        .router
        .oneshot(get("/v1/app/feedbacks?page=1&limit=50"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    // Raw passthrough of the stored record.
    assert_eq!(data[0]["rating"], "dislike");
    assert_eq!(data[0]["content"], "too short");
    assert_eq!(data[0]["from_source"], "user");
    assert_eq!(data[0]["message_id"], message_id.to_string());
}

#[tokio::test]
async fn app_feedbacks_rejects_out_of_range_limit() {
    let env = chat_env();
    let response = env
        .router
        .clone()
        .oneshot(get("/v1/app/feedbacks?limit=102"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 101 is within range for this endpoint.
    let response = env
        .router
        .oneshot(get("/v1/app/feedbacks?limit=101"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// GET /v1/messages/:message_id/suggested
// =============================================================================

#[tokio::test]
async fn suggested_questions_return_result_and_data() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(get(format!(
            "/v1/messages/{}/suggested?user=u1",
            env.messages[2].id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["result"], "success");
    assert_eq!(
        body["data"],
        json!(["What about exchanges?", "Is shipping free?"])
    );
}

#[tokio::test]
async fn suggested_questions_require_a_user() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(get(format!("/v1/messages/{}/suggested", env.messages[2].id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn suggested_questions_disabled_is_400_before_generation() {
    let env = build_env(
        AppMode::Chat,
        AppFeatures {
            suggested_questions_after_answer: false,
            ..Default::default()
        },
    );

    let response = env
        .router
        .oneshot(get(format!(
            "/v1/messages/{}/suggested?user=u1",
            env.messages[0].id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn suggested_questions_unknown_message_is_404() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(get(format!(
            "/v1/messages/{}/suggested?user=u1",
            MessageId::new()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Audio endpoints
// =============================================================================

fn multipart_request(uri: &str, boundary: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", TOKEN))
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

fn audio_form(boundary: &str, mime_type: &str) -> String {
    format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"user\"\r\n\r\n\
         u1\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"clip.mp3\"\r\n\
         Content-Type: {mime}\r\n\r\n\
         fake-audio-bytes\r\n\
         --{b}--\r\n",
        b = boundary,
        mime = mime_type
    )
}

#[tokio::test]
async fn audio_to_text_transcribes_valid_upload() {
    let env = chat_env();
    let boundary = "test-boundary";
    let response = env
        .router
        .oneshot(multipart_request(
            "/v1/audio-to-text",
            boundary,
            audio_form(boundary, "audio/mp3"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"text": "play it back"}));
}

#[tokio::test]
async fn audio_to_text_rejects_non_audio_upload() {
    let env = chat_env();
    let boundary = "test-boundary";
    let response = env
        .router
        .oneshot(multipart_request(
            "/v1/audio-to-text",
            boundary,
            audio_form(boundary, "video/mp4"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn audio_to_text_without_file_is_400() {
    let env = chat_env();
    let boundary = "test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"user\"\r\n\r\n\
         u1\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let response = env
        .router
        .oneshot(multipart_request("/v1/audio-to-text", boundary, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn text_to_audio_streams_mpeg() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(post_json(
            "/v1/text-to-audio",
            json!({"text": "say this", "user": "u1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("audio/mpeg")
    );
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"mock-mpeg-audio");
}

#[tokio::test]
async fn text_to_audio_without_text_or_message_is_400() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(post_json("/v1/text-to-audio", json!({"user": "u1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn text_to_audio_speaks_a_stored_answer() {
    let env = chat_env();
    let response = env
        .router
        .oneshot(post_json(
            "/v1/text-to-audio",
            json!({"message_id": env.messages[1].id.to_string(), "user": "u1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
