// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Fallback Orchestrator
//!
//! Walks the provider chain strictly in configured order until one provider
//! returns usable text, then normalizes that text into a [`Plan`].
//!
//! Availability problems (timeouts, rate limits, bad status, unconfigured
//! providers, fatal vendor rejections) move on to the next provider. A parse
//! or shape failure after a successful call ends the request: the same prompt
//! is not replayed against other providers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::normalizer::ResponseNormalizer;
use crate::domain::llm::{AttemptResult, InferenceRequest, ProviderClient};
use crate::domain::patient::PatientProfile;
use crate::domain::plan::{Plan, PlanCorrupted};
use crate::domain::planner_config::PlanningConfig;
use crate::infrastructure::prompt_template_engine::{
    PromptContext, PromptTemplateEngine, SYSTEM_PROMPT,
};

/// Terminal errors surfaced to the caller of a plan request
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("Failed to render prompt: {0}")]
    Prompt(String),

    #[error("Provider '{provider}' returned an unusable plan: {source}")]
    PlanCorrupted {
        provider: String,
        #[source]
        source: PlanCorrupted,
    },

    #[error("All {} configured providers failed", .attempts.len())]
    AllProvidersExhausted { attempts: Vec<ProviderFailure> },

    #[error("Plan generation exceeded the {0:?} deadline")]
    DeadlineExceeded(Duration),
}

impl PlanningError {
    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PlanningError::Prompt(_) => "prompt_error",
            PlanningError::PlanCorrupted { .. } => "plan_corrupted",
            PlanningError::AllProvidersExhausted { .. } => "all_providers_exhausted",
            PlanningError::DeadlineExceeded(_) => "deadline_exceeded",
        }
    }

    /// Retry-prompting message shown to the patient
    pub fn user_message(&self) -> &'static str {
        match self {
            PlanningError::PlanCorrupted { .. } => {
                "We received an incomplete recovery plan. Please submit your details again."
            }
            PlanningError::DeadlineExceeded(_) => {
                "Generating your recovery plan took too long. Please try again in a moment."
            }
            PlanningError::AllProvidersExhausted { .. } | PlanningError::Prompt(_) => {
                "Our recovery plan service is busy right now. Please try again in a moment."
            }
        }
    }
}

/// One failed attempt, kept for the exhaustion report
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub fatal: bool,
    pub reason: String,
}

/// Raw text from the first provider that succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutput {
    pub provider: String,
    pub text: String,
}

pub struct FallbackOrchestrator {
    providers: Vec<Arc<dyn ProviderClient>>,
    prompts: PromptTemplateEngine,
    normalizer: ResponseNormalizer,
    planning: PlanningConfig,
}

impl FallbackOrchestrator {
    pub fn new(providers: Vec<Arc<dyn ProviderClient>>, planning: PlanningConfig) -> Self {
        Self {
            providers,
            prompts: PromptTemplateEngine::new(),
            normalizer: ResponseNormalizer::new(),
            planning,
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Render the inference request for a patient
    pub fn build_request(&self, profile: &PatientProfile) -> Result<InferenceRequest, PlanningError> {
        let context = PromptContext::from_profile(profile);
        let prompt = self
            .prompts
            .render_with_fallback(self.planning.prompt_template.as_deref(), &context)
            .map_err(|e| PlanningError::Prompt(format!("{:#}", e)))?;

        let mut request = InferenceRequest::new(prompt).with_system(SYSTEM_PROMPT);
        if let Some(temperature) = self.planning.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.planning.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        Ok(request)
    }

    /// Produce a validated plan for the patient
    pub async fn run(&self, profile: &PatientProfile) -> Result<Plan, PlanningError> {
        let request = self.build_request(profile)?;
        let output = self.complete(&request).await?;

        self.normalizer.normalize(&output.text).map_err(|source| {
            warn!(provider = %output.provider, error = %source, "Provider output failed normalization");
            PlanningError::PlanCorrupted {
                provider: output.provider,
                source,
            }
        })
    }

    /// Return the first successful completion, trying providers in order
    pub async fn complete(&self, request: &InferenceRequest) -> Result<ProviderOutput, PlanningError> {
        let total = self.providers.len();
        let mut failures = Vec::new();

        for (index, provider) in self.providers.iter().enumerate() {
            let started = Instant::now();
            let result = provider.attempt(request).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            let outcome = result.outcome();

            match result {
                AttemptResult::Success(text) => {
                    info!(
                        provider = provider.name(),
                        attempt = index + 1,
                        total,
                        elapsed_ms,
                        outcome,
                        "Provider attempt succeeded"
                    );
                    return Ok(ProviderOutput {
                        provider: provider.name().to_string(),
                        text,
                    });
                }
                AttemptResult::RecoverableFailure(reason) => {
                    warn!(
                        provider = provider.name(),
                        attempt = index + 1,
                        total,
                        elapsed_ms,
                        outcome,
                        %reason,
                        "Provider attempt failed, trying next provider"
                    );
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        fatal: false,
                        reason: reason.to_string(),
                    });
                }
                AttemptResult::FatalFailure(reason) => {
                    warn!(
                        provider = provider.name(),
                        attempt = index + 1,
                        total,
                        elapsed_ms,
                        outcome,
                        %reason,
                        "Provider rejected the request, trying next provider"
                    );
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        fatal: true,
                        reason,
                    });
                }
            }
        }

        warn!(attempted = failures.len(), "All providers exhausted");
        Err(PlanningError::AllProvidersExhausted { attempts: failures })
    }
}
