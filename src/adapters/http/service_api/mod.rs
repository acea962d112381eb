//! Service API - the token-authenticated surface for app integrations.

pub mod audio_handlers;
pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ServiceApiError, ServiceApiState};
pub use routes::{service_api_router, service_api_routes};
