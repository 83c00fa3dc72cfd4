use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::StructuringError;
use crate::config::{ModelConfig, Secret};

/// Azure OpenAI chat-completions client.
///
/// `endpoint` is the deployment base URL; requests go to
/// `{endpoint}/chat/completions?api-version=...` with an `api-key` header.
pub struct ChatCompletionsClient {
    endpoint: String,
    api_key: Secret,
    api_version: String,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// No request timeout is set here; the endpoint's own limits apply.
    pub fn new(endpoint: &str, api_key: Secret, api_version: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            api_version: api_version.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(&config.endpoint, config.api_key.clone(), &config.api_version)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from `/chat/completions`
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, StructuringError> {
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    StructuringError::Connection(self.endpoint.clone())
                } else {
                    StructuringError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StructuringError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| StructuringError::MalformedResponse(e.to_string()))?;

        first_choice_content(parsed)
    }
}

fn first_choice_content(response: ChatResponse) -> Result<String, StructuringError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| StructuringError::MalformedResponse("no choices returned".into()))?;

    Ok(choice.message.and_then(|m| m.content).unwrap_or_default())
}

/// Prompt and sampling settings seen by [`MockLlmClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCompletion {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Mock LLM client for testing. Returns a configurable response.
pub struct MockLlmClient {
    response: Result<String, String>,
    calls: Mutex<Vec<RecordedCompletion>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Client whose every call fails with an HTTP-level error.
    pub fn failing(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCompletion> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, StructuringError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCompletion {
                model: model.to_string(),
                prompt: prompt.to_string(),
                temperature,
            });
        }
        self.response
            .clone()
            .map_err(StructuringError::HttpClient)
    }
}
