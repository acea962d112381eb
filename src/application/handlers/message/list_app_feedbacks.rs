//! ListAppFeedbacksHandler - page through every feedback of an app.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ServiceApp};
use crate::domain::message::MessageFeedback;
use crate::ports::FeedbackRepository;

/// Query to list an app's feedback, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListAppFeedbacksQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

/// Handler for the bulk feedback listing operation.
///
/// The stored records are returned as-is; unlike message listing there
/// is no field projection on this endpoint.
pub struct ListAppFeedbacksHandler {
    feedbacks: Arc<dyn FeedbackRepository>,
}

impl ListAppFeedbacksHandler {
    pub fn new(feedbacks: Arc<dyn FeedbackRepository>) -> Self {
        Self { feedbacks }
    }

    pub async fn handle(
        &self,
        app: &ServiceApp,
        query: ListAppFeedbacksQuery,
    ) -> Result<Vec<MessageFeedback>, DomainError> {
        self.feedbacks
            .page_for_app(&app.id, query.page, query.limit)
            .await
    }
}
