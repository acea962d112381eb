//! OpenAI-compatible implementation of SuggestionGenerator.
//!
//! Asks a chat-completions endpoint for follow-up questions and expects
//! a JSON array of strings back.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiSuggestionConfig::new(api_key)
//!     .with_model("gpt-4-turbo")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let generator = OpenAiSuggestionGenerator::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AiError, SuggestionContext, SuggestionGenerator};

/// Instruction appended after the conversation history.
const SUGGESTION_INSTRUCTION: &str = "Predict the three questions the human is most likely to \
ask next, based on the conversation so far. Keep each question under 20 words. Reply with a \
JSON array of strings and nothing else.";

/// Configuration for the suggestion generator.
#[derive(Debug, Clone)]
pub struct OpenAiSuggestionConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAiSuggestionConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible suggestion generator.
pub struct OpenAiSuggestionGenerator {
    config: OpenAiSuggestionConfig,
    client: Client,
}

impl OpenAiSuggestionGenerator {
    /// Creates a new generator with the given configuration.
    pub fn new(config: OpenAiSuggestionConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn build_request(&self, context: &SuggestionContext) -> ChatRequest {
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: "You suggest follow-up questions a user might ask next.".to_string(),
        }];

        for turn in &context.history {
            messages.push(ChatMessage {
                role: "user".to_string(),
                content: turn.query.clone(),
            });
            messages.push(ChatMessage {
                role: "assistant".to_string(),
                content: turn.answer.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: SUGGESTION_INSTRUCTION.to_string(),
        });

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: 0.3,
            max_tokens: 256,
            user: Some(context.end_user.clone()),
        }
    }

    async fn send_request(&self, request: &ChatRequest) -> Result<Response, AiError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AiError::network(format!("Connection failed: {}", e))
                } else {
                    AiError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, AiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(AiError::AuthenticationFailed),
            429 => Err(AiError::RateLimited {
                retry_after_secs: None,
            }),
            code => Err(AiError::Provider {
                status: code,
                message: error_body,
            }),
        }
    }

    fn is_retryable(error: &AiError) -> bool {
        matches!(
            error,
            AiError::Network(_)
                | AiError::Timeout { .. }
                | AiError::Provider { status: 500..=599, .. }
        )
    }

    /// Parses the model output into a list of questions.
    ///
    /// Models occasionally wrap the array in a markdown code fence;
    /// strip it before parsing.
    fn parse_questions(content: &str) -> Result<Vec<String>, AiError> {
        let trimmed = content.trim();
        let stripped = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|s| s.strip_suffix("```"))
            .unwrap_or(trimmed)
            .trim();

        serde_json::from_str::<Vec<String>>(stripped)
            .map_err(|e| AiError::invalid_response(format!("Expected a JSON array: {}", e)))
    }
}

#[async_trait]
impl SuggestionGenerator for OpenAiSuggestionGenerator {
    async fn suggest(&self, context: &SuggestionContext) -> Result<Vec<String>, AiError> {
        let request = self.build_request(context);

        let mut attempt = 0;
        let response = loop {
            let result = match self.send_request(&request).await {
                Ok(response) => self.handle_response_status(response).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(response) => break response,
                Err(e) if Self::is_retryable(&e) && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        "Suggestion request failed, retrying"
                    );
                    sleep(Duration::from_millis(500 * 2u64.pow(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        };

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::invalid_response(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AiError::invalid_response("No choices in response"))?;

        Self::parse_questions(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
