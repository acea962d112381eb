//! App token middleware and extractor for axum.
//!
//! This module provides:
//! - `app_token_middleware` - Layer that validates Bearer app tokens and
//!   injects the resolved app into extensions
//! - `RequireApp` - Extractor handing the app to route handlers
//!
//! # Architecture
//!
//! The middleware uses the `AppTokenValidator` port, keeping it
//! storage-agnostic. Whether tokens live in Postgres or a test mock, the
//! middleware doesn't change.
//!
//! ```text
//! Request → app_token_middleware → injects ServiceApp into extensions
//!                                      ↓
//!                              Handler → RequireApp extractor reads from extensions
//! ```
//!
//! Every service API route requires a token; a missing or invalid
//! `Authorization` header fails the request with 401 before any handler
//! runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::ServiceApp;
use crate::ports::{AppTokenValidator, AuthError};

/// Auth middleware state - wraps the token validator.
pub type ServiceAuthState = Arc<dyn AppTokenValidator>;

/// App token middleware validating `Authorization: Bearer <token>`.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the `AppTokenValidator` port
/// 3. On success, injects `ServiceApp` into request extensions
/// 4. On a missing or invalid token, returns 401 Unauthorized
pub async fn app_token_middleware(
    State(validator): State<ServiceAuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthorized("Authorization header must be provided and start with 'Bearer'");
    };

    match validator.validate(token).await {
        Ok(app) => {
            request.extensions_mut().insert(app);
            next.run(request).await
        }
        Err(AuthError::InvalidToken) => unauthorized("Access token is invalid"),
        Err(AuthError::ServiceUnavailable(msg)) => {
            tracing::error!(error = %msg, "Token validation unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": "Authentication service unavailable",
                    "code": "AUTH_ERROR"
                })),
            )
                .into_response()
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": "UNAUTHORIZED"
        })),
    )
        .into_response()
}

/// Extractor that hands the validated app to a handler.
///
/// If no app is in the request extensions (i.e. the token middleware did
/// not run or did not validate a token), returns 401 Unauthorized.
///
/// # Example
///
/// ```ignore
/// async fn my_handler(RequireApp(app): RequireApp) -> impl IntoResponse {
///     format!("Hello, {}!", app.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireApp(pub ServiceApp);

impl<S> axum::extract::FromRequestParts<S> for RequireApp
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<ServiceApp>()
                .cloned()
                .map(RequireApp)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No validated app token accompanied the request.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required")
            }
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": "UNAUTHENTICATED"
            })),
        )
            .into_response()
    }
}
