//! HTTP adapter - axum routers, DTOs, and middleware.

pub mod middleware;
pub mod service_api;
