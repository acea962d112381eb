//! PostgreSQL adapters - sqlx implementations of the persistence ports.

mod conversation_reader;
mod end_user_store;
mod feedback_repository;
mod message_reader;

pub use conversation_reader::PostgresConversationReader;
pub use end_user_store::PostgresEndUserStore;
pub use feedback_repository::PostgresFeedbackRepository;
pub use message_reader::PostgresMessageReader;
