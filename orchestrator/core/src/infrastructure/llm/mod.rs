// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the ProviderClient interface and one
// vendor API, folding every failure into an AttemptResult.

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod registry;

pub use anthropic::AnthropicAdapter;
pub use ollama::OllamaAdapter;
pub use openai::OpenAIAdapter;
pub use registry::ProviderRegistry;

const SNIPPET_CHARS: usize = 512;

/// Bounded excerpt of a response body for diagnostics
pub(crate) fn snippet(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= SNIPPET_CHARS {
        body.to_string()
    } else {
        let mut excerpt: String = body.chars().take(SNIPPET_CHARS).collect();
        excerpt.push_str("...");
        excerpt
    }
}
