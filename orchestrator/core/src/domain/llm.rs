// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Provider-neutral inference interface.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Isolates the fallback orchestrator from vendor call shapes

// LLM Provider Domain Interface (Anti-Corruption Layer)
//
// Every upstream vendor is reached through `ProviderClient`. Clients never
// return `Err`: transport, status and payload problems are folded into an
// `AttemptResult` so the orchestrator can decide whether to move on.
//
// Implementations in infrastructure/llm/ directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Domain interface for one (vendor, model, credential) triple
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable name used in logs and error reports
    fn name(&self) -> &str;

    /// Issue one inference request. Must not panic or propagate errors.
    async fn attempt(&self, request: &InferenceRequest) -> AttemptResult;
}

/// A rendered prompt plus sampling options.
///
/// Built once per plan request and shared read-only by every attempt.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Rendered user prompt, target response schema included
    pub prompt: Arc<str>,

    /// Optional system message sent ahead of the prompt
    pub system: Option<String>,

    /// Sampling temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<Arc<str>>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Outcome of a single provider attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// Non-empty completion text
    Success(String),

    /// Timeout, rate limit, transport or payload problem
    RecoverableFailure(FailureReason),

    /// Vendor rejected the request outright (bad key, unknown model)
    FatalFailure(String),
}

impl AttemptResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptResult::Success(_))
    }

    /// Short outcome label for structured logs
    pub fn outcome(&self) -> &'static str {
        match self {
            AttemptResult::Success(_) => "success",
            AttemptResult::RecoverableFailure(_) => "recoverable_failure",
            AttemptResult::FatalFailure(_) => "fatal_failure",
        }
    }

    /// Treat whitespace-only text as an empty response
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            AttemptResult::RecoverableFailure(FailureReason::EmptyResponse)
        } else {
            AttemptResult::Success(text)
        }
    }
}

/// Why a provider attempt did not produce usable text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// No credential or endpoint; no network call was made
    Unconfigured,

    /// Per-call deadline elapsed and the request was dropped
    Timeout,

    /// HTTP 429
    RateLimited,

    /// Connection, TLS or body read error
    Network(String),

    /// Completion payload missing or blank
    EmptyResponse,

    /// Response body could not be decoded
    MalformedResponse(String),

    /// Any other non-2xx status
    Http { status: u16, body: String },

    /// Lazily acquired runtime could not be reached in time
    RuntimeUnavailable(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Unconfigured => write!(f, "unconfigured"),
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::RateLimited => write!(f, "rate limited"),
            FailureReason::Network(e) => write!(f, "network error: {}", e),
            FailureReason::EmptyResponse => write!(f, "empty response"),
            FailureReason::MalformedResponse(e) => write!(f, "malformed response: {}", e),
            FailureReason::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            FailureReason::RuntimeUnavailable(e) => write!(f, "runtime unavailable: {}", e),
        }
    }
}

/// Map a non-2xx status to an attempt outcome.
///
/// Shared by the HTTP adapters so 401/403/404 are reported as fatal and
/// everything else stays recoverable.
pub fn classify_status(status: u16, body: String, model: &str) -> AttemptResult {
    match status {
        401 | 403 => AttemptResult::FatalFailure(format!("authentication rejected: {}", body)),
        404 => AttemptResult::FatalFailure(format!("model not found: {}", model)),
        429 => AttemptResult::RecoverableFailure(FailureReason::RateLimited),
        _ => AttemptResult::RecoverableFailure(FailureReason::Http { status, body }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_empty_response() {
        assert_eq!(
            AttemptResult::from_text("  \n".to_string()),
            AttemptResult::RecoverableFailure(FailureReason::EmptyResponse)
        );
        assert!(AttemptResult::from_text("{}".to_string()).is_success());
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(401, "bad key".into(), "m"),
            AttemptResult::FatalFailure(_)
        ));
        assert_eq!(
            classify_status(429, String::new(), "m"),
            AttemptResult::RecoverableFailure(FailureReason::RateLimited)
        );
        assert_eq!(
            classify_status(500, "boom".into(), "m"),
            AttemptResult::RecoverableFailure(FailureReason::Http {
                status: 500,
                body: "boom".into()
            })
        );
    }

    #[test]
    fn test_request_builder() {
        let request = InferenceRequest::new("hello")
            .with_system("be brief")
            .with_temperature(0.2)
            .with_max_tokens(64);
        assert_eq!(&*request.prompt, "hello");
        assert_eq!(request.system.as_deref(), Some("be brief"));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(64));
    }
}
