// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Registry - Ordered Provider Chain Construction
//
// Turns the configured provider list into ProviderClient instances, keeping
// configuration order. Disabled entries are skipped; entries whose key cannot
// be resolved are still registered and report `Unconfigured` when attempted.

use crate::domain::llm::ProviderClient;
use crate::domain::planner_config::{PlannerConfigManifest, ProviderConfig, ProviderType};
use std::sync::Arc;
use tracing::{info, warn};

use super::anthropic::{self, AnthropicAdapter};
use super::ollama::OllamaAdapter;
use super::openai::OpenAIAdapter;

/// Ordered set of provider clients
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    /// Create provider registry from planner configuration
    pub fn from_config(config: &PlannerConfigManifest) -> Self {
        info!("Initializing LLM provider registry");

        let mut providers = Vec::new();
        for provider_config in &config.spec.providers {
            if !provider_config.enabled {
                info!("Provider '{}' disabled, skipping", provider_config.name);
                continue;
            }

            let provider = Self::create_provider(provider_config);
            info!(
                "Registered provider #{}: {} ({:?}, model {})",
                providers.len() + 1,
                provider_config.name,
                provider_config.provider_type,
                provider_config.model
            );
            providers.push(provider);
        }

        if providers.is_empty() {
            warn!("No LLM providers configured - every plan request will fail");
        }

        Self { providers }
    }

    /// Create a provider instance from configuration
    fn create_provider(config: &ProviderConfig) -> Arc<dyn ProviderClient> {
        let api_key = config.resolve_api_key();
        if api_key.is_none() && config.requires_key() {
            warn!(
                "Provider '{}' has no usable API key; it will be skipped at request time",
                config.name
            );
        }

        match config.provider_type {
            ProviderType::Openai | ProviderType::OpenaiCompatible => Arc::new(
                OpenAIAdapter::new(
                    config.name.clone(),
                    config.endpoint.clone(),
                    api_key,
                    config.model.clone(),
                    config.timeout,
                )
                .with_requires_key(config.requires_key()),
            ),
            ProviderType::Anthropic => {
                let endpoint = if config.endpoint.trim().is_empty() {
                    anthropic::DEFAULT_ENDPOINT.to_string()
                } else {
                    config.endpoint.clone()
                };
                Arc::new(AnthropicAdapter::new(
                    config.name.clone(),
                    endpoint,
                    api_key,
                    config.model.clone(),
                    config.timeout,
                ))
            }
            ProviderType::Ollama => Arc::new(OllamaAdapter::new(
                config.name.clone(),
                config.endpoint.clone(),
                config.model.clone(),
                config.timeout,
                config.acquire_timeout,
            )),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn into_providers(self) -> Vec<Arc<dyn ProviderClient>> {
        self.providers
    }
}
