// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Anthropic LLM Provider Adapter
//
// Anti-Corruption Layer for the Anthropic messages API

use crate::domain::llm::{
    classify_status, AttemptResult, FailureReason, InferenceRequest, ProviderClient,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::snippet;

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    name: String,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicAdapter {
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
            model: model.into(),
            timeout,
        }
    }

    async fn send(&self, api_key: &str, request: &InferenceRequest) -> AttemptResult {
        let body = AnthropicRequest {
            model: &self.model,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens.unwrap_or(4096),
            system: request.system.as_deref(),
            temperature: request.temperature,
        };

        let url = format!("{}/messages", self.endpoint.trim_end_matches('/'));
        debug!(provider = %self.name, %url, model = %self.model, "Sending messages request");

        let response = match self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return AttemptResult::RecoverableFailure(FailureReason::Network(e.to_string())),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return AttemptResult::RecoverableFailure(FailureReason::Network(e.to_string())),
        };

        if !status.is_success() {
            return classify_status(status.as_u16(), snippet(&text), &self.model);
        }

        let parsed: AnthropicResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                return AttemptResult::RecoverableFailure(FailureReason::MalformedResponse(
                    e.to_string(),
                ))
            }
        };

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        AttemptResult::from_text(text)
    }
}

#[async_trait]
impl ProviderClient for AnthropicAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, request: &InferenceRequest) -> AttemptResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return AttemptResult::RecoverableFailure(FailureReason::Unconfigured);
        };
        if self.endpoint.trim().is_empty() {
            return AttemptResult::RecoverableFailure(FailureReason::Unconfigured);
        }

        match tokio::time::timeout(self.timeout, self.send(api_key, request)).await {
            Ok(result) => result,
            Err(_) => AttemptResult::RecoverableFailure(FailureReason::Timeout),
        }
    }
}
