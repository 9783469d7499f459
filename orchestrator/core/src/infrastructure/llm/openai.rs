// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI LLM Provider Adapter
//
// Anti-Corruption Layer for the chat completions API.
// Also serves OpenAI-compatible endpoints (Gemini's OpenAI layer, Groq, the
// edge proxy), including keyless ones when `requires_key` is false.

use crate::domain::llm::{
    classify_status, AttemptResult, FailureReason, InferenceRequest, ProviderClient,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::snippet;

pub struct OpenAIAdapter {
    client: reqwest::Client,
    name: String,
    endpoint: String,
    api_key: Option<String>,
    requires_key: bool,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIResponseMessage>,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

/// `{ "error": ... }` as returned by the edge proxy and most vendors
#[derive(Deserialize)]
struct ErrorBody {
    error: serde_json::Value,
}

impl OpenAIAdapter {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            name: name.into(),
            endpoint: endpoint.into(),
            api_key,
            requires_key: true,
            model: model.into(),
            timeout,
        }
    }

    /// Allow calls without a key (free proxies)
    pub fn with_requires_key(mut self, requires_key: bool) -> Self {
        self.requires_key = requires_key;
        self
    }

    fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && (!self.requires_key || self.api_key.is_some())
    }

    async fn send(&self, request: &InferenceRequest) -> AttemptResult {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(OpenAIMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(OpenAIMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = OpenAIRequest {
            model: &self.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        debug!(provider = %self.name, %url, model = %self.model, "Sending chat completion");

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return AttemptResult::RecoverableFailure(FailureReason::Network(e.to_string())),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return AttemptResult::RecoverableFailure(FailureReason::Network(e.to_string())),
        };

        if !status.is_success() {
            return classify_status(status.as_u16(), error_detail(&text), &self.model);
        }

        let parsed: OpenAIResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                return AttemptResult::RecoverableFailure(FailureReason::MalformedResponse(
                    format!("{} (body: {})", e, snippet(&text)),
                ))
            }
        };

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        AttemptResult::from_text(content)
    }
}

/// Prefer the `error` field of a JSON error body, fall back to the raw text
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: serde_json::Value::String(message),
        }) => message,
        Ok(ErrorBody { error }) => error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| snippet(&error.to_string())),
        Err(_) => snippet(body),
    }
}

#[async_trait]
impl ProviderClient for OpenAIAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, request: &InferenceRequest) -> AttemptResult {
        if !self.is_configured() {
            return AttemptResult::RecoverableFailure(FailureReason::Unconfigured);
        }

        // Dropping the send future on elapse aborts the in-flight request.
        match tokio::time::timeout(self.timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => AttemptResult::RecoverableFailure(FailureReason::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_shapes() {
        assert_eq!(error_detail(r#"{"error":"upstream down"}"#), "upstream down");
        assert_eq!(
            error_detail(r#"{"error":{"message":"quota exceeded","code":429}}"#),
            "quota exceeded"
        );
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_missing_key_is_unconfigured() {
        let adapter = OpenAIAdapter::new(
            "user-key",
            "http://127.0.0.1:9",
            None,
            "gpt-4o-mini",
            Duration::from_secs(1),
        );
        assert_eq!(
            adapter.attempt(&InferenceRequest::new("hi")).await,
            AttemptResult::RecoverableFailure(FailureReason::Unconfigured)
        );
    }

    #[tokio::test]
    async fn test_blank_endpoint_is_unconfigured() {
        let adapter = OpenAIAdapter::new("proxy", "  ", None, "m", Duration::from_secs(1))
            .with_requires_key(false);
        assert_eq!(
            adapter.attempt(&InferenceRequest::new("hi")).await,
            AttemptResult::RecoverableFailure(FailureReason::Unconfigured)
        );
    }
}
