//! Configuration schema structures with serde support

use super::error::{ConfigError, ConfigResult, ValidationError};
use super::secrets::{SafeLogging, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

/// Default Generative Language endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Root configuration structure for the adapter
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Remote provider connection
    pub provider: ProviderConfig,

    /// Model selection and sampling
    #[serde(default)]
    pub model: ModelSettings,

    /// System instructions by prompt key
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub prompts: HashMap<String, String>,
}

/// Provider connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key (supports environment variable interpolation)
    pub api_key: SecretString,

    /// Base URL for the provider API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSettings {
    /// Model identifier (e.g., "gemini-2.0-flash")
    #[serde(default = "default_model")]
    pub id: String,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            id: default_model(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl ProviderConfig {
    /// Create provider settings with default endpoint and timeout
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl AdapterConfig {
    /// Create a configuration for an API key with defaults everywhere else
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            provider: ProviderConfig::new(api_key),
            model: ModelSettings::default(),
            prompts: HashMap::new(),
        }
    }

    /// Register a system instruction under a prompt key
    pub fn with_prompt(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.prompts.insert(key.into(), text.into());
        self
    }

    /// Build a configuration from the process environment
    ///
    /// Reads `GEMINI_API_KEY` (falling back to `GOOGLE_API_KEY`),
    /// `GEMINI_MODEL` and `GEMINI_BASE_URL`.
    pub fn from_env() -> ConfigResult<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .map_err(|_| ConfigError::EnvVarNotFound {
                var: "GEMINI_API_KEY".to_string(),
            })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.model.id = model;
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            config.provider.base_url = base_url;
        }
        Ok(config)
    }

    /// Built-in validation of required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider.api_key.is_empty() {
            return Err(ValidationError::required("provider.api_key"));
        }
        if self.provider.base_url.is_empty() {
            return Err(ValidationError::required("provider.base_url"));
        }
        if self.model.id.is_empty() {
            return Err(ValidationError::required("model.id"));
        }
        Ok(())
    }
}

impl SafeLogging for AdapterConfig {
    fn safe_for_logging(&self) -> String {
        let mut prompt_keys: Vec<_> = self.prompts.keys().map(String::as_str).collect();
        prompt_keys.sort_unstable();
        format!(
            "AdapterConfig {{ base_url: {}, api_key: {}, model: {}, prompts: [{}] }}",
            self.provider.base_url,
            self.provider.api_key,
            self.model.id,
            prompt_keys.join(", ")
        )
    }

    fn safe_debug(&self) -> String {
        format!(
            "{} (api_key: {})",
            self.safe_for_logging(),
            self.provider.api_key.partial_redact()
        )
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config: AdapterConfig = serde_yaml::from_str(
            r#"
provider:
  api_key: test-key
"#,
        )
        .unwrap();

        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.provider.timeout_secs, 60);
        assert_eq!(config.model.id, DEFAULT_MODEL);
        assert!(config.prompts.is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<AdapterConfig, _> = serde_yaml::from_str(
            r#"
provider:
  api_key: test-key
  organization: acme
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let config = AdapterConfig::new("");
        let err = config.validate().unwrap_err();
        assert_eq!(err.field_path, "provider.api_key");
    }

    #[test]
    fn test_safe_logging_hides_key() {
        let config = AdapterConfig::new("AIzaSyD-very-secret-key").with_prompt("storefront", "Be brief.");
        let logged = config.safe_for_logging();
        assert!(!logged.contains("very-secret"));
        assert!(logged.contains("storefront"));
    }
}
