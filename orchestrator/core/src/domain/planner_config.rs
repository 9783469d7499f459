// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Planner Configuration Types
//
// Defines the configuration schema for a plan-generating node, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Ordered provider chain (attempted top to bottom)
// - Per-provider call timeouts and the overall planning deadline
// - Network and observability settings

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infrastructure::prompt_template_engine::PromptTemplateEngine;

pub const API_VERSION: &str = "physio/v1";
pub const KIND: &str = "PlannerConfig";

/// Environment variable holding the patient-supplied key of the default chain
pub const USER_KEY_ENV: &str = "PHYSIO_USER_API_KEY";
const DEFAULT_USER_KEY_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Top-level Kubernetes-style planner configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfigManifest {
    /// API version (must be "physio/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "PlannerConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: PlannerConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable deployment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfigSpec {
    /// Providers in fallback order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub planning: PlanningConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderType {
    /// OpenAI chat completions
    Openai,
    /// Any chat-completions-compatible endpoint (Gemini OpenAI layer, Groq, edge proxies)
    OpenaiCompatible,
    Anthropic,
    /// Local engine acquired lazily on first use
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider name (e.g., "user-key", "free-proxy")
    pub name: String,

    #[serde(rename = "type")]
    pub provider_type: ProviderType,

    /// API base URL
    pub endpoint: String,

    /// Model identifier sent to the vendor
    pub model: String,

    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Whether a missing key makes this provider unconfigured.
    /// Defaults to true for every type except ollama.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_key: Option<bool>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Per-call timeout
    #[serde(with = "humantime_serde", default = "default_call_timeout")]
    pub timeout: Duration,

    /// Runtime acquisition timeout (ollama only)
    #[serde(with = "humantime_serde", default = "default_acquire_timeout")]
    pub acquire_timeout: Duration,
}

impl ProviderConfig {
    pub fn requires_key(&self) -> bool {
        self.requires_key
            .unwrap_or(self.provider_type != ProviderType::Ollama)
    }

    /// Resolve the configured key. Unset, blank or unresolvable keys yield
    /// `None`; the provider then reports itself unconfigured at attempt time.
    pub fn resolve_api_key(&self) -> Option<String> {
        let key = match self.api_key.as_deref()? {
            k if k.starts_with("env:") => {
                let var_name = &k["env:".len()..];
                match std::env::var(var_name) {
                    Ok(value) => value,
                    Err(_) => {
                        tracing::warn!(
                            "Environment variable not set for provider '{}': {}",
                            self.name,
                            var_name
                        );
                        return None;
                    }
                }
            }
            k => k.to_string(),
        };

        let key = key.trim().to_string();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Overall wall-clock budget for one plan request
    #[serde(with = "humantime_serde", default = "default_deadline")]
    pub deadline: Duration,

    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,

    /// Handlebars template overriding the built-in plan prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            deadline: default_deadline(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            prompt_template: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_call_timeout() -> Duration {
    Duration::from_secs(40)
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_deadline() -> Duration {
    Duration::from_secs(30)
}

fn default_temperature() -> Option<f32> {
    Some(0.7)
}

fn default_max_tokens() -> Option<u32> {
    Some(4096)
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for PlannerConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "physio-planner".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                labels: None,
            },
            spec: PlannerConfigSpec {
                providers: default_provider_chain(),
                ..PlannerConfigSpec::default()
            },
        }
    }
}

/// Chain used when no configuration file exists: the patient's own key,
/// then the local engine.
fn default_provider_chain() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "user-key".to_string(),
            provider_type: ProviderType::OpenaiCompatible,
            endpoint: DEFAULT_USER_KEY_ENDPOINT.to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: Some(format!("env:{}", USER_KEY_ENV)),
            requires_key: None,
            enabled: true,
            timeout: default_call_timeout(),
            acquire_timeout: default_acquire_timeout(),
        },
        ProviderConfig {
            name: "local-engine".to_string(),
            provider_type: ProviderType::Ollama,
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            requires_key: None,
            enabled: true,
            timeout: default_call_timeout(),
            acquire_timeout: default_acquire_timeout(),
        },
    ]
}

impl PlannerConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. PHYSIO_CONFIG_PATH environment variable
    /// 2. ./physio-config.yaml (working directory)
    /// 3. ~/.physio/config.yaml (user home)
    /// 4. /etc/physio/config.yaml (system, Unix) or C:\ProgramData\Physio\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PHYSIO_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./physio-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".physio").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/physio/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Physio\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path (fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using empty defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PHYSIO_DEADLINE") {
            match humantime::parse_duration(&val) {
                Ok(deadline) => {
                    tracing::info!("Environment override: PHYSIO_DEADLINE={}", val);
                    self.spec.planning.deadline = deadline;
                }
                Err(e) => {
                    tracing::warn!(
                        "Invalid value for PHYSIO_DEADLINE: '{}' ({}). Ignoring.",
                        val,
                        e
                    );
                }
            }
        }

        if let Ok(level) = std::env::var("PHYSIO_LOG_LEVEL") {
            tracing::info!("Environment override: PHYSIO_LOG_LEVEL={}", level);
            self.spec
                .observability
                .get_or_insert_with(ObservabilityConfig::default)
                .logging
                .get_or_insert_with(LoggingConfig::default)
                .level = level;
        }
    }

    /// Enabled providers, in fallback order
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.spec.providers.iter().filter(|p| p.enabled)
    }

    pub fn logging(&self) -> LoggingConfig {
        self.spec
            .observability
            .as_ref()
            .and_then(|o| o.logging.clone())
            .unwrap_or_default()
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.planning.deadline.is_zero() {
            anyhow::bail!("spec.planning.deadline must be greater than zero");
        }

        let mut seen = HashSet::new();
        for provider in &self.spec.providers {
            if provider.name.is_empty() {
                anyhow::bail!("Provider name cannot be empty");
            }

            if !seen.insert(provider.name.as_str()) {
                anyhow::bail!("Duplicate provider name: {}", provider.name);
            }

            if provider.model.is_empty() {
                anyhow::bail!("Model identifier cannot be empty for provider: {}", provider.name);
            }

            if provider.timeout.is_zero() {
                anyhow::bail!("Timeout must be greater than zero for provider: {}", provider.name);
            }

            if provider.provider_type == ProviderType::Ollama && provider.acquire_timeout.is_zero() {
                anyhow::bail!(
                    "acquire_timeout must be greater than zero for provider: {}",
                    provider.name
                );
            }
        }

        if let Some(template) = &self.spec.planning.prompt_template {
            PromptTemplateEngine::new()
                .validate_template(template)
                .context("spec.planning.prompt_template is not a valid template")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
apiVersion: physio/v1
kind: PlannerConfig
metadata:
  name: clinic
spec:
  providers:
    - name: user-key
      type: openai-compatible
      endpoint: https://generativelanguage.googleapis.com/v1beta/openai
      model: gemini-2.0-flash
      api_key: env:PHYSIO_TEST_UNSET_KEY_7731
      timeout: 30s
    - name: free-proxy
      type: openai-compatible
      endpoint: https://proxy.example/v1
      model: llama-3.3-70b
      requires_key: false
    - name: local-engine
      type: ollama
      endpoint: http://localhost:11434
      model: llama3.2
      acquire_timeout: 8s
  planning:
    deadline: 30s
"#;

    #[test]
    fn test_default_manifest() {
        let manifest = PlannerConfigManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, KIND);
        assert!(!manifest.metadata.name.is_empty());
        assert_eq!(manifest.spec.planning.deadline, Duration::from_secs(30));
        assert!(manifest.validate().is_ok());

        let names: Vec<_> = manifest.enabled_providers().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["user-key", "local-engine"]);
        let user = &manifest.spec.providers[0];
        assert_eq!(user.api_key.as_deref(), Some("env:PHYSIO_USER_API_KEY"));
        assert!(user.requires_key());
        assert!(!manifest.spec.providers[1].requires_key());
    }

    #[test]
    fn test_broken_prompt_template_fails_validation() {
        let mut manifest = PlannerConfigManifest::from_yaml_str(SAMPLE).unwrap();

        manifest.spec.planning.prompt_template = Some("{{#if name}}unclosed".to_string());
        let err = manifest.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("prompt_template"));

        manifest.spec.planning.prompt_template = Some("Plan for {{name}}".to_string());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_parse_sample() {
        let manifest = PlannerConfigManifest::from_yaml_str(SAMPLE).unwrap();
        assert!(manifest.validate().is_ok());

        let names: Vec<_> = manifest.enabled_providers().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["user-key", "free-proxy", "local-engine"]);

        let user = &manifest.spec.providers[0];
        assert_eq!(user.timeout, Duration::from_secs(30));
        assert!(user.requires_key());
        assert_eq!(user.resolve_api_key(), None);

        let proxy = &manifest.spec.providers[1];
        assert_eq!(proxy.timeout, Duration::from_secs(40));
        assert!(!proxy.requires_key());

        let local = &manifest.spec.providers[2];
        assert_eq!(local.provider_type, ProviderType::Ollama);
        assert!(!local.requires_key());
        assert_eq!(local.acquire_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_resolve_api_key() {
        let mut manifest = PlannerConfigManifest::from_yaml_str(SAMPLE).unwrap();
        let provider = &mut manifest.spec.providers[0];

        std::env::set_var("PHYSIO_TEST_SET_KEY_7732", "sk-test");
        provider.api_key = Some("env:PHYSIO_TEST_SET_KEY_7732".to_string());
        assert_eq!(provider.resolve_api_key().as_deref(), Some("sk-test"));

        provider.api_key = Some("  literal-key ".to_string());
        assert_eq!(provider.resolve_api_key().as_deref(), Some("literal-key"));

        provider.api_key = Some("   ".to_string());
        assert_eq!(provider.resolve_api_key(), None);
    }

    #[test]
    fn test_validation() {
        let mut manifest = PlannerConfigManifest::from_yaml_str(SAMPLE).unwrap();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "Deployment".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.providers[1].name = "user-key".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.providers[1].name = "free-proxy".to_string();

        manifest.spec.providers[2].model = String::new();
        assert!(manifest.validate().is_err());
        manifest.spec.providers[2].model = "llama3.2".to_string();

        manifest.spec.planning.deadline = Duration::ZERO;
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_unknown_provider_type_rejected() {
        let yaml = SAMPLE.replace("type: ollama", "type: carrier-pigeon");
        assert!(PlannerConfigManifest::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("physio-config.yaml");

        let manifest = PlannerConfigManifest::from_yaml_str(SAMPLE).unwrap();
        manifest.to_yaml_file(&path).unwrap();

        let loaded = PlannerConfigManifest::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.metadata.name, "clinic");
        assert_eq!(loaded.spec.providers.len(), 3);
        assert_eq!(loaded.spec.providers[1].timeout, Duration::from_secs(40));
    }
}
