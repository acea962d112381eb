//! Message operations: listing, feedback, suggested questions.

mod list_app_feedbacks;
mod list_messages;
mod submit_feedback;
mod suggested_questions;

pub use list_app_feedbacks::{ListAppFeedbacksHandler, ListAppFeedbacksQuery};
pub use list_messages::{ListMessagesHandler, ListMessagesQuery, MessagePage};
pub use submit_feedback::{SubmitFeedbackCommand, SubmitFeedbackHandler};
pub use suggested_questions::SuggestedQuestionsHandler;
