//! Mock token validator for testing.
//!
//! Implements the `AppTokenValidator` port against an in-memory token
//! map, avoiding the need for a database in tests.
//!
//! # Example
//!
//! ```ignore
//! use parlance::adapters::auth::MockTokenValidator;
//!
//! let validator = MockTokenValidator::new()
//!     .with_app("app-valid-token", my_test_app());
//!
//! let result = validator.validate("app-valid-token").await;
//! assert!(result.is_ok());
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::ServiceApp;
use crate::ports::{AppTokenValidator, AuthError};

/// Mock token validator for testing.
///
/// Stores a map of tokens to apps. Tokens not in the map return
/// `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockTokenValidator {
    /// Map of valid tokens to their apps
    tokens: RwLock<HashMap<String, ServiceApp>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockTokenValidator {
    /// Creates a new empty mock validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to an app.
    pub fn with_app(self, token: impl Into<String>, app: ServiceApp) -> Self {
        self.tokens.write().unwrap().insert(token.into(), app);
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }
}

#[async_trait]
impl AppTokenValidator for MockTokenValidator {
    async fn validate(&self, token: &str) -> Result<ServiceApp, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AppFeatures, AppId, AppMode, TenantId};

    fn test_app() -> ServiceApp {
        ServiceApp::new(
            AppId::new(),
            TenantId::new(),
            "Support Bot",
            AppMode::Chat,
            AppFeatures::default(),
        )
    }

    #[tokio::test]
    async fn known_token_resolves_app() {
        let validator = MockTokenValidator::new().with_app("app-token", test_app());
        let app = validator.validate("app-token").await.unwrap();
        assert_eq!(app.name, "Support Bot");
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let validator = MockTokenValidator::new();
        assert!(matches!(
            validator.validate("nope").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn removed_token_becomes_invalid() {
        let validator = MockTokenValidator::new().with_app("app-token", test_app());
        validator.remove_token("app-token");
        assert!(matches!(
            validator.validate("app-token").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn forced_error_wins() {
        let validator = MockTokenValidator::new()
            .with_app("app-token", test_app())
            .with_error(AuthError::ServiceUnavailable("down".to_string()));
        assert!(matches!(
            validator.validate("app-token").await,
            Err(AuthError::ServiceUnavailable(_))
        ));
    }
}
