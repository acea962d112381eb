//! HTTP middleware.

mod auth;

pub use auth::{app_token_middleware, AuthRejection, RequireApp, ServiceAuthState};
