//! PostgreSQL implementation of AppTokenValidator.
//!
//! Resolves `api_tokens` rows to their app record, including the
//! per-app feature switches, in a single query.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    AppFeatures, AppId, AppMode, ServiceApp, TenantId, TtsSettings,
};
use crate::ports::{AppTokenValidator, AuthError};

/// PostgreSQL implementation of AppTokenValidator.
#[derive(Clone)]
pub struct PostgresTokenValidator {
    pool: PgPool,
}

impl PostgresTokenValidator {
    /// Creates a new PostgresTokenValidator.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppTokenValidator for PostgresTokenValidator {
    async fn validate(&self, token: &str) -> Result<ServiceApp, AuthError> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.tenant_id, a.name, a.mode,
                   a.suggested_questions_after_answer,
                   a.speech_to_text,
                   a.text_to_speech_enabled,
                   a.text_to_speech_voice
            FROM api_tokens t
            JOIN apps a ON a.id = t.app_id
            WHERE t.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::ServiceUnavailable(format!("Failed to look up token: {}", e)))?;

        let row = row.ok_or(AuthError::InvalidToken)?;

        let mode: String = row.get("mode");
        let mode: AppMode = mode
            .parse()
            .map_err(|e| AuthError::ServiceUnavailable(format!("Corrupt app mode: {}", e)))?;

        let app = ServiceApp::new(
            AppId::from_uuid(row.get("id")),
            TenantId::from_uuid(row.get("tenant_id")),
            row.get::<String, _>("name"),
            mode,
            AppFeatures {
                suggested_questions_after_answer: row.get("suggested_questions_after_answer"),
                speech_to_text: row.get("speech_to_text"),
                text_to_speech: TtsSettings {
                    enabled: row.get("text_to_speech_enabled"),
                    voice: row.get("text_to_speech_voice"),
                },
            },
        );

        // Usage tracking only; a failed touch must not fail the request.
        let touch = sqlx::query("UPDATE api_tokens SET last_used_at = NOW() WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await;
        if let Err(e) = touch {
            tracing::warn!(error = %e, "Failed to touch token last_used_at");
        }

        Ok(app)
    }
}
