//! HTTP handlers for the service API audio endpoints.

use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::handlers::audio::{
    AudioUpload, SpeechOutput, SynthesizeSpeechCommand,
};
use crate::domain::foundation::MessageId;

use super::dto::{EndUserParams, TextToAudioRequest, TranscriptionResponse};
use super::handlers::{parse_id, ServiceApiError, ServiceApiState};
use crate::adapters::http::middleware::RequireApp;

// ════════════════════════════════════════════════════════════════════════════════
// POST /v1/audio-to-text
// ════════════════════════════════════════════════════════════════════════════════

/// POST /v1/audio-to-text - Transcribe an uploaded audio file.
///
/// Multipart body with a `file` part; an optional `user` part (or query
/// parameter) identifies the end user.
///
/// # Errors
/// - 400 Bad Request: feature disabled, no file part
/// - 413 Payload Too Large: file over 30 MB
/// - 415 Unsupported Media Type: not a supported audio type
pub async fn audio_to_text(
    State(state): State<ServiceApiState>,
    RequireApp(app): RequireApp,
    Query(params): Query<EndUserParams>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceApiError> {
    let mut upload: Option<AudioUpload> = None;
    let mut form_user: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ServiceApiError::BadRequest(format!("Invalid multipart body: {}", e))
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("audio").to_string();
                let mime_type = field.content_type().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    ServiceApiError::BadRequest(format!("Failed to read audio upload: {}", e))
                })?;
                upload = Some(AudioUpload {
                    filename,
                    mime_type,
                    data,
                });
            }
            Some("user") => {
                form_user = field.text().await.ok().filter(|u| !u.is_empty());
            }
            _ => {}
        }
    }

    let external_id = form_user.or(params.user);
    let end_user = state.resolve_end_user(&app, external_id.as_deref()).await?;

    let text = state
        .transcribe_audio
        .handle(&app, &end_user, upload)
        .await?;

    Ok(Json(TranscriptionResponse { text }))
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /v1/text-to-audio
// ════════════════════════════════════════════════════════════════════════════════

/// POST /v1/text-to-audio - Synthesize speech from text or a stored answer.
///
/// # Body
/// - `message_id`: speak this message's answer (UUID)
/// - `text`: speak free text (required when `message_id` is absent)
/// - `voice`: overrides the app's configured voice
/// - `user`: end user identifier
///
/// Responds with an `audio/mpeg` stream, or 204 No Content when the
/// referenced message has nothing to speak yet.
///
/// # Errors
/// - 400 Bad Request: feature disabled, missing text, no voice available
/// - 404 Not Found: message missing
pub async fn text_to_audio(
    State(state): State<ServiceApiState>,
    RequireApp(app): RequireApp,
    Json(request): Json<TextToAudioRequest>,
) -> Result<Response, ServiceApiError> {
    let message_id: Option<MessageId> = request
        .message_id
        .as_deref()
        .map(|value| parse_id(value, "message_id"))
        .transpose()?;

    let end_user = state
        .resolve_end_user(&app, request.user.as_deref())
        .await?;

    let output = state
        .synthesize_speech
        .handle(
            &app,
            &end_user,
            SynthesizeSpeechCommand {
                message_id,
                text: request.text,
                voice: request.voice,
            },
        )
        .await?;

    match output {
        SpeechOutput::Empty => Ok(StatusCode::NO_CONTENT.into_response()),
        SpeechOutput::Stream(stream) => {
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "audio/mpeg")
                .body(Body::from_stream(stream))
                .map_err(|e| ServiceApiError::Internal(e.to_string()))?;
            Ok(response)
        }
    }
}
