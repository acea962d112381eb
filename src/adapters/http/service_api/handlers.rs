//! HTTP handlers for the service API message endpoints.
//!
//! These handlers connect axum routes to application layer operations:
//! parse and validate parameters, resolve the end user, delegate to
//! exactly one operation handler, and translate domain errors into
//! HTTP status codes.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::handlers::audio::{SynthesizeSpeechHandler, TranscribeAudioHandler};
use crate::application::handlers::message::{
    ListAppFeedbacksHandler, ListAppFeedbacksQuery, ListMessagesHandler, ListMessagesQuery,
    SubmitFeedbackCommand, SubmitFeedbackHandler, SuggestedQuestionsHandler,
};
use crate::domain::foundation::{
    ConversationId, DomainError, EndUser, ErrorCode, InvokeFrom, MessageId, ServiceApp,
};
use crate::domain::message::FeedbackRating;
use crate::ports::{EndUserStore, RateLimiter};

use super::dto::{
    message_to_view, AppFeedbacksEnvelope, AppFeedbacksParams, EndUserParams, ErrorResponse,
    FeedbackRequest, ListMessagesParams, MessageListEnvelope, ResultResponse,
    SuggestedQuestionsEnvelope,
};
use crate::adapters::http::middleware::RequireApp;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for service API handlers.
#[derive(Clone)]
pub struct ServiceApiState {
    pub end_users: Arc<dyn EndUserStore>,
    pub list_messages: Arc<ListMessagesHandler>,
    pub submit_feedback: Arc<SubmitFeedbackHandler>,
    pub list_app_feedbacks: Arc<ListAppFeedbacksHandler>,
    pub suggested_questions: Arc<SuggestedQuestionsHandler>,
    pub transcribe_audio: Arc<TranscribeAudioHandler>,
    pub synthesize_speech: Arc<SynthesizeSpeechHandler>,
    /// Optional rate limiter for AI-backed endpoints.
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl ServiceApiState {
    /// Creates a new ServiceApiState.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        end_users: Arc<dyn EndUserStore>,
        list_messages: Arc<ListMessagesHandler>,
        submit_feedback: Arc<SubmitFeedbackHandler>,
        list_app_feedbacks: Arc<ListAppFeedbacksHandler>,
        suggested_questions: Arc<SuggestedQuestionsHandler>,
        transcribe_audio: Arc<TranscribeAudioHandler>,
        synthesize_speech: Arc<SynthesizeSpeechHandler>,
    ) -> Self {
        Self {
            end_users,
            list_messages,
            submit_feedback,
            list_app_feedbacks,
            suggested_questions,
            transcribe_audio,
            synthesize_speech,
            rate_limiter: None,
        }
    }

    /// Creates a new ServiceApiState with a rate limiter.
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    /// Resolves the end user for a request.
    pub(super) async fn resolve_end_user(
        &self,
        app: &ServiceApp,
        external_id: Option<&str>,
    ) -> Result<EndUser, ServiceApiError> {
        Ok(self.end_users.get_or_create(&app.id, external_id).await?)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Parameter Validation
// ════════════════════════════════════════════════════════════════════════════════

pub(super) fn parse_id<T>(value: &str, field: &str) -> Result<T, ServiceApiError>
where
    T: FromStr<Err = uuid::Error>,
{
    value
        .parse()
        .map_err(|_| ServiceApiError::BadRequest(format!("{} is not a valid uuid", field)))
}

/// Validates a limit against an inclusive range, rejecting out-of-range
/// values instead of clamping them.
pub(super) fn bounded_limit(
    value: Option<u32>,
    min: u32,
    max: u32,
    default: u32,
) -> Result<u32, ServiceApiError> {
    match value {
        None => Ok(default),
        Some(v) if (min..=max).contains(&v) => Ok(v),
        Some(v) => Err(ServiceApiError::BadRequest(format!(
            "limit must be between {} and {}, got {}",
            min, max, v
        ))),
    }
}

fn ensure_chat_app(app: &ServiceApp) -> Result<(), ServiceApiError> {
    if app.is_chat_based() {
        Ok(())
    } else {
        Err(ServiceApiError::BadRequest(
            "App mode is not a chat app.".to_string(),
        ))
    }
}

fn require_user(user: Option<&str>) -> Result<&str, ServiceApiError> {
    user.filter(|u| !u.is_empty())
        .ok_or_else(|| ServiceApiError::BadRequest("User is required.".to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /v1/messages
// ════════════════════════════════════════════════════════════════════════════════

/// GET /v1/messages - List messages of a conversation.
///
/// # Query Parameters
/// - `conversation_id`: conversation to read (required, UUID)
/// - `first_id`: pagination cursor for "load older messages"
/// - `limit`: page size, 1-100 (default: 20)
/// - `user`: end user identifier
///
/// # Errors
/// - 400 Bad Request: non-chat app, invalid ids, out-of-range limit
/// - 404 Not Found: conversation or cursor message missing
pub async fn list_messages(
    State(state): State<ServiceApiState>,
    RequireApp(app): RequireApp,
    Query(params): Query<ListMessagesParams>,
) -> Result<impl IntoResponse, ServiceApiError> {
    ensure_chat_app(&app)?;

    let conversation_id: ConversationId = parse_id(&params.conversation_id, "conversation_id")?;
    let first_id: Option<MessageId> = params
        .first_id
        .as_deref()
        .map(|value| parse_id(value, "first_id"))
        .transpose()?;
    let limit = bounded_limit(params.limit, 1, 100, 20)?;

    let end_user = state.resolve_end_user(&app, params.user.as_deref()).await?;

    let page = state
        .list_messages
        .handle(
            &app,
            &end_user,
            ListMessagesQuery {
                conversation_id,
                first_id,
                limit,
            },
        )
        .await?;

    Ok(Json(MessageListEnvelope {
        limit: page.limit,
        has_more: page.has_more,
        data: page.data.iter().map(message_to_view).collect(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /v1/messages/:message_id/feedbacks
// ════════════════════════════════════════════════════════════════════════════════

/// POST /v1/messages/:message_id/feedbacks - Submit feedback on a message.
///
/// # Body
/// - `rating`: `"like"`, `"dislike"`, or null (clears existing feedback)
/// - `content`: optional free text
/// - `user`: end user identifier (required)
///
/// # Errors
/// - 400 Bad Request: missing user, unknown rating value
/// - 404 Not Found: message missing
pub async fn submit_feedback(
    State(state): State<ServiceApiState>,
    RequireApp(app): RequireApp,
    Path(message_id): Path<String>,
    Json(request): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let message_id: MessageId = parse_id(&message_id, "message_id")?;
    let user = require_user(request.user.as_deref())?;

    let rating = match request.rating.as_deref() {
        None => None,
        Some(value) => Some(value.parse::<FeedbackRating>().map_err(|_| {
            ServiceApiError::BadRequest("Rating must be 'like', 'dislike', or null.".to_string())
        })?),
    };

    let end_user = state.resolve_end_user(&app, Some(user)).await?;

    state
        .submit_feedback
        .handle(
            &app,
            &end_user,
            SubmitFeedbackCommand {
                message_id,
                rating,
                content: request.content,
            },
        )
        .await?;

    Ok(Json(ResultResponse::success()))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /v1/app/feedbacks
// ════════════════════════════════════════════════════════════════════════════════

/// GET /v1/app/feedbacks - List every feedback of the app.
///
/// # Query Parameters
/// - `page`: 1-based page number (default: 1)
/// - `limit`: page size, 1-101 (default: 20)
///
/// # Errors
/// - 400 Bad Request: out-of-range page or limit
pub async fn list_app_feedbacks(
    State(state): State<ServiceApiState>,
    RequireApp(app): RequireApp,
    Query(params): Query<AppFeedbacksParams>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ServiceApiError::BadRequest(
            "page must be 1 or greater".to_string(),
        ));
    }
    let limit = bounded_limit(params.limit, 1, 101, 20)?;

    let data = state
        .list_app_feedbacks
        .handle(&app, ListAppFeedbacksQuery { page, limit })
        .await?;

    Ok(Json(AppFeedbacksEnvelope { data }))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /v1/messages/:message_id/suggested
// ════════════════════════════════════════════════════════════════════════════════

/// GET /v1/messages/:message_id/suggested - Suggested follow-up questions.
///
/// # Query Parameters
/// - `user`: end user identifier (required)
///
/// # Errors
/// - 400 Bad Request: non-chat app, suggestions disabled, missing user
/// - 404 Not Found: message missing
/// - 429 Too Many Requests: per-app rate limit exceeded
pub async fn suggested_questions(
    State(state): State<ServiceApiState>,
    RequireApp(app): RequireApp,
    Path(message_id): Path<String>,
    Query(params): Query<EndUserParams>,
) -> Result<impl IntoResponse, ServiceApiError> {
    ensure_chat_app(&app)?;

    let message_id: MessageId = parse_id(&message_id, "message_id")?;
    let user = require_user(params.user.as_deref())?;

    if let Some(ref rate_limiter) = state.rate_limiter {
        let key = format!("suggested:{}", app.id);
        if !rate_limiter.check_rate_limit(&key).await {
            return Err(ServiceApiError::RateLimited(
                "Too many suggestion requests. Please wait before trying again.".to_string(),
            ));
        }
    }

    let end_user = state.resolve_end_user(&app, Some(user)).await?;

    let questions = state
        .suggested_questions
        .handle(&app, &end_user, message_id, InvokeFrom::ServiceApi)
        .await?;

    Ok(Json(SuggestedQuestionsEnvelope::success(questions)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum ServiceApiError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    RateLimited(String),
    Internal(String),
}

impl From<DomainError> for ServiceApiError {
    fn from(err: DomainError) -> Self {
        match err.code() {
            ErrorCode::ConversationNotFound
            | ErrorCode::MessageNotFound
            | ErrorCode::FirstMessageNotFound
            | ErrorCode::AppNotFound => ServiceApiError::NotFound(err.message),
            ErrorCode::NotChatApp
            | ErrorCode::SuggestedQuestionsDisabled
            | ErrorCode::SpeechToTextDisabled
            | ErrorCode::TextToSpeechDisabled
            | ErrorCode::NoAudioUploaded
            | ErrorCode::NoVoiceAvailable
            | ErrorCode::InvalidRequest
            | ErrorCode::ValidationFailed => ServiceApiError::BadRequest(err.message),
            ErrorCode::UnsupportedAudioType => ServiceApiError::UnsupportedMediaType(err.message),
            ErrorCode::AudioTooLarge => ServiceApiError::PayloadTooLarge(err.message),
            ErrorCode::RateLimited => ServiceApiError::RateLimited(err.message),
            ErrorCode::Unauthorized => {
                // Token validation happens in middleware; treat a late
                // authorization failure as an internal inconsistency.
                ServiceApiError::Internal(err.message)
            }
            ErrorCode::ProviderError | ErrorCode::DatabaseError | ErrorCode::InternalError => {
                ServiceApiError::Internal(err.message)
            }
        }
    }
}

impl IntoResponse for ServiceApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServiceApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", msg),
            ),
            ServiceApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("NOT_FOUND", msg))
            }
            ServiceApiError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::new("PAYLOAD_TOO_LARGE", msg),
            ),
            ServiceApiError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorResponse::new("UNSUPPORTED_MEDIA_TYPE", msg),
            ),
            ServiceApiError::RateLimited(msg) => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::new("RATE_LIMITED", msg),
            ),
            ServiceApiError::Internal(msg) => {
                // No detail leaks to the client; the log line carries it.
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "Internal Server Error."),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}
