//! OpenAI Turn Generator - Implementation of TurnGenerator for OpenAI-compatible
//! chat completion APIs.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let generator = OpenAITurnGenerator::new(config)?;
//! ```
//!
//! # Output
//!
//! The interview methodology asks the model for a JSON object
//! `{"message": ..., "question_id": ...}`. Replies that are not valid JSON are
//! taken verbatim as the turn text with no question link.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::QuestionId;
use crate::domain::interview::Role;
use crate::ports::{
    GeneratedTurn, GeneratorInfo, TurnGenerationError, TurnGenerator, TurnInput, TurnRequest,
};

/// Configuration for the OpenAI turn generator.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            temperature: Some(0.7),
            max_tokens: Some(400),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible turn generator.
pub struct OpenAITurnGenerator {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAITurnGenerator {
    /// Creates a new generator with the given configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the HTTP client cannot be built
    pub fn new(config: OpenAIConfig) -> Result<Self, TurnGenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                TurnGenerationError::InvalidRequest(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts a turn request to OpenAI's format.
    fn to_openai_request(&self, request: &TurnRequest) -> OpenAIRequest {
        let mut messages = vec![OpenAIMessage {
            role: "system".to_string(),
            content: request.context.clone(),
        }];

        match &request.input {
            TurnInput::Seed(seed) => messages.push(OpenAIMessage {
                role: "user".to_string(),
                content: seed.clone(),
            }),
            TurnInput::Transcript(turns) => {
                messages.extend(turns.iter().map(|turn| OpenAIMessage {
                    role: match turn.role {
                        Role::Interviewer => "assistant",
                        Role::Respondent => "user",
                    }
                    .to_string(),
                    content: turn.content.clone(),
                }))
            }
        }

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }

    /// Sends a request.
    async fn send_request(&self, request: &TurnRequest) -> Result<Response, TurnGenerationError> {
        let openai_request = self.to_openai_request(request);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TurnGenerationError::timeout(self.config.timeout.as_secs() as u32)
                } else if e.is_connect() {
                    TurnGenerationError::network(format!("Connection failed: {}", e))
                } else {
                    TurnGenerationError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(
        &self,
        response: Response,
    ) -> Result<Response, TurnGenerationError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let header_retry = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(TurnGenerationError::AuthenticationFailed),
            429 => Err(TurnGenerationError::rate_limited(
                header_retry.unwrap_or_else(|| parse_retry_after(&error_body)),
            )),
            400 => Err(TurnGenerationError::InvalidRequest(error_body)),
            500..=599 => Err(TurnGenerationError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(TurnGenerationError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses a completion response into a generated turn.
    async fn parse_response(&self, response: Response) -> Result<GeneratedTurn, TurnGenerationError> {
        let response = self.handle_response_status(response).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| TurnGenerationError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TurnGenerationError::parse("No choices in response"))?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(TurnGenerationError::content_filtered(
                "completion withheld by content filter",
            ));
        }

        let content = choice
            .message
            .content
            .ok_or_else(|| TurnGenerationError::parse("Completion has no content"))?;

        Ok(parse_turn_content(&content))
    }
}

#[async_trait]
impl TurnGenerator for OpenAITurnGenerator {
    async fn generate_turn(
        &self,
        request: TurnRequest,
    ) -> Result<GeneratedTurn, TurnGenerationError> {
        tracing::debug!(
            session_id = %request.session_id,
            model = %self.config.model,
            opening = request.is_opening(),
            context_chars = request.context.len(),
            "Requesting interviewer turn"
        );

        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn generator_info(&self) -> GeneratorInfo {
        GeneratorInfo::new("openai", &self.config.model)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Reads the structured reply, falling back to the raw text.
fn parse_turn_content(content: &str) -> GeneratedTurn {
    match serde_json::from_str::<StructuredTurn>(content.trim()) {
        Ok(structured) => {
            let turn = GeneratedTurn::text(structured.message);
            match structured
                .question_id
                .and_then(|id| QuestionId::new(id.trim()).ok())
            {
                Some(id) => turn.with_question(id),
                None => turn,
            }
        }
        Err(_) => GeneratedTurn::text(content),
    }
}

/// Parses "try again in Xs" from an error body, defaulting to 30 seconds.
fn parse_retry_after(error_body: &str) -> u32 {
    let message = serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    message
        .as_deref()
        .and_then(|s| s.find("try again in ").map(|idx| &s[idx + 13..]))
        .and_then(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .unwrap_or(30)
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StructuredTurn {
    message: String,
    #[serde(default)]
    question_id: Option<String>,
}
