//! Message domain - chat messages and their satellite records.
//!
//! Messages are produced by the chat pipeline elsewhere in the platform;
//! the service API reads them, attaches feedback, and projects them out.

mod agent_thought;
mod conversation;
mod feedback;
mod message;
mod message_file;
mod retriever_resource;

pub use agent_thought::AgentThought;
pub use conversation::Conversation;
pub use feedback::{FeedbackRating, FeedbackSource, MessageFeedback};
pub use message::{Message, MessageStatus};
pub use message_file::{FileBelongsTo, MessageFile};
pub use retriever_resource::RetrieverResource;
