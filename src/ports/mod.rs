//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `MessageReader` - Message lookup and cursor pagination
//! - `ConversationReader` - Conversation scoping queries
//! - `FeedbackRepository` - Feedback CRUD and per-app paging
//! - `EndUserStore` - Lazy end-user provisioning
//!
//! ## Provider Ports
//!
//! - `AppTokenValidator` - Bearer token to app resolution
//! - `SuggestionGenerator` - Follow-up question generation
//! - `SpeechTranscriber` / `SpeechSynthesizer` - Audio in/out
//!
//! ## Infrastructure Ports
//!
//! - `FileUrlSigner` - Signed file URL issuing and refresh
//! - `RateLimiter` - Request throttling

mod conversation_reader;
mod end_user_store;
mod feedback_repository;
mod message_reader;
mod rate_limiter;
mod speech;
mod suggestion_generator;
mod token_validator;
mod url_signer;

pub use conversation_reader::ConversationReader;
pub use end_user_store::EndUserStore;
pub use feedback_repository::FeedbackRepository;
pub use message_reader::{MessageCursor, MessageReader};
pub use rate_limiter::RateLimiter;
pub use speech::{AudioStream, SpeechSynthesizer, SpeechTranscriber};
pub use suggestion_generator::{AiError, HistoryTurn, SuggestionContext, SuggestionGenerator};
pub use token_validator::{AppTokenValidator, AuthError};
pub use url_signer::{resign_embedded_urls, resign_inputs, FileUrlSigner};
