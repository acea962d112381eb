//! App token validator port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::ServiceApp;

/// Errors from token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is unknown or has been revoked.
    #[error("Invalid token")]
    InvalidToken,

    /// The token store could not be reached.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Validator port resolving a bearer token to its application.
///
/// Keeps the HTTP middleware storage-agnostic: the production adapter
/// reads the token table, tests swap in a mock.
#[async_trait]
pub trait AppTokenValidator: Send + Sync {
    /// Validate a bearer token and return the app it grants access to.
    async fn validate(&self, token: &str) -> Result<ServiceApp, AuthError>;
}
