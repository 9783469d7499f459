// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Ollama LLM Provider Adapter
//
// Anti-Corruption Layer for a local Ollama engine, used as the last resort in
// the chain. The engine is acquired lazily: the first attempt checks the
// runtime under `acquire_timeout`, and only a successful check is cached.

use crate::domain::llm::{
    classify_status, AttemptResult, FailureReason, InferenceRequest, ProviderClient,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::snippet;

pub struct OllamaAdapter {
    client: reqwest::Client,
    name: String,
    endpoint: String,
    model: String,
    timeout: Duration,
    acquire_timeout: Duration,
    runtime: OnceCell<()>,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

impl OllamaAdapter {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        acquire_timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            name: name.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            timeout,
            acquire_timeout,
            runtime: OnceCell::new(),
        }
    }

    /// Whether the runtime has been acquired by an earlier attempt
    pub fn is_acquired(&self) -> bool {
        self.runtime.initialized()
    }

    async fn acquire(&self) -> Result<(), String> {
        self.runtime
            .get_or_try_init(|| async {
                let url = format!("{}/api/tags", self.endpoint.trim_end_matches('/'));
                debug!(provider = %self.name, %url, "Acquiring local runtime");

                match tokio::time::timeout(self.acquire_timeout, self.client.get(&url).send()).await
                {
                    Err(_) => Err(format!(
                        "no answer from {} within {:?}",
                        url, self.acquire_timeout
                    )),
                    Ok(Err(e)) => Err(e.to_string()),
                    Ok(Ok(response)) if response.status().is_success() => {
                        info!(provider = %self.name, "Local runtime acquired");
                        Ok(())
                    }
                    Ok(Ok(response)) => Err(format!("HTTP {}", response.status())),
                }
            })
            .await
            .map(|_| ())
    }

    async fn send(&self, request: &InferenceRequest) -> AttemptResult {
        let body = OllamaRequest {
            model: &self.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: false,
            options: Some(OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens.map(|t| t as i32),
            }),
        };

        let url = format!("{}/api/generate", self.endpoint.trim_end_matches('/'));

        let response = match self.client.post(&url).json(&body).send().await {
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

        match serde_json::from_str::<OllamaResponse>(&text) {
            Ok(parsed) => AttemptResult::from_text(parsed.response),
            Err(e) => AttemptResult::RecoverableFailure(FailureReason::MalformedResponse(e.to_string())),
        }
    }
}

#[async_trait]
impl ProviderClient for OllamaAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, request: &InferenceRequest) -> AttemptResult {
        if self.endpoint.trim().is_empty() {
            return AttemptResult::RecoverableFailure(FailureReason::Unconfigured);
        }

        if let Err(reason) = self.acquire().await {
            return AttemptResult::RecoverableFailure(FailureReason::RuntimeUnavailable(reason));
        }

        match tokio::time::timeout(self.timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => AttemptResult::RecoverableFailure(FailureReason::Timeout),
        }
    }
}
