//! Application layer - one handler per service API operation.

pub mod handlers;
