//! Axum routes for the service API.
//!
//! Defines the routing table for all service API endpoints and applies
//! the app token middleware around them.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use super::audio_handlers::{audio_to_text, text_to_audio};
use super::handlers::{
    list_app_feedbacks, list_messages, submit_feedback, suggested_questions, ServiceApiState,
};
use crate::adapters::http::middleware::{app_token_middleware, ServiceAuthState};

/// Creates routes for the service API endpoints.
///
/// Endpoints:
/// - GET /messages - List messages of a conversation
/// - POST /messages/:message_id/feedbacks - Submit feedback on a message
/// - GET /messages/:message_id/suggested - Suggested follow-up questions
/// - GET /app/feedbacks - List every feedback of the app
/// - POST /audio-to-text - Transcribe an audio upload
/// - POST /text-to-audio - Synthesize speech
pub fn service_api_routes() -> Router<ServiceApiState> {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/messages/:message_id/feedbacks", post(submit_feedback))
        .route("/messages/:message_id/suggested", get(suggested_questions))
        .route("/app/feedbacks", get(list_app_feedbacks))
        .route("/audio-to-text", post(audio_to_text))
        .route("/text-to-audio", post(text_to_audio))
}

/// Combined router with all service API routes under /v1, guarded by the
/// app token middleware.
pub fn service_api_router(validator: ServiceAuthState) -> Router<ServiceApiState> {
    Router::new()
        .nest("/v1", service_api_routes())
        .layer(middleware::from_fn_with_state(
            validator,
            app_token_middleware,
        ))
}
