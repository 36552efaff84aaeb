//! OpenAI chat completion backend
//!
//! Sends the whole prompt as a single user message to
//! `{api_base}/chat/completions` and returns the content of the first choice.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CompletionError, FeedbackGenerator};
use crate::config::LlmConfig;
use crate::{Error, Result};

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    api_base: String,
    api_key: String,
}

impl OpenAiGenerator {
    /// Create a client for the configured endpoint
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("grader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FeedbackGenerator for OpenAiGenerator {
    async fn complete(&self, prompt: &str, model: &str) -> std::result::Result<String, CompletionError> {
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model, prompt_len = prompt.len(), "Requesting chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(
                status.as_u16(),
                error_message(&text),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        extract_feedback(parsed)
    }
}

/// Map a transport-level failure onto the error taxonomy
fn transport_error(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Timeout(err.to_string())
    } else if let Some(status) = err.status() {
        CompletionError::from_status(status.as_u16(), err.to_string())
    } else {
        CompletionError::Connection(err.to_string())
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn extract_feedback(response: ChatResponse) -> std::result::Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| {
            CompletionError::MalformedResponse("response contained no generated text".to_string())
        })
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
