//! Configuration validation utilities

use super::env::ENV_VAR_PATTERN;
use super::error::ValidationError;
use super::schema::AdapterConfig;
use url::Url;

/// Configuration validator with additional validation rules
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &AdapterConfig) -> Result<(), ValidationError> {
        // First run the built-in validation
        config.validate()?;

        self.validate_provider(config)?;
        self.validate_model(config)?;
        self.validate_prompts(config)?;

        Ok(())
    }

    fn validate_provider(&self, config: &AdapterConfig) -> Result<(), ValidationError> {
        let provider = &config.provider;

        if ENV_VAR_PATTERN.is_match(provider.api_key.expose_secret()) {
            return Err(ValidationError::required("provider.api_key")
                .with_context("API key still contains an uninterpolated placeholder"));
        }

        let url = Url::parse(&provider.base_url)
            .map_err(|e| ValidationError::invalid_url("provider.base_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::invalid_url(
                "provider.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if provider.timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "provider.timeout_secs",
                "timeout must be at least one second",
            ));
        }

        Ok(())
    }

    fn validate_model(&self, config: &AdapterConfig) -> Result<(), ValidationError> {
        if let Some(temperature) = config.model.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ValidationError::out_of_range(
                    "model.temperature",
                    format!("{} is outside 0.0..=2.0", temperature),
                ));
            }
        }

        if config.model.max_output_tokens == Some(0) {
            return Err(ValidationError::out_of_range(
                "model.max_output_tokens",
                "must be positive",
            ));
        }

        Ok(())
    }

    fn validate_prompts(&self, config: &AdapterConfig) -> Result<(), ValidationError> {
        for (key, text) in &config.prompts {
            if key.trim().is_empty() {
                return Err(ValidationError::required("prompts")
                    .with_context("prompt keys must be non-empty"));
            }
            if text.trim().is_empty() {
                return Err(ValidationError::required(format!("prompts.{}", key)));
            }
        }
        Ok(())
    }

    /// Extract environment variables from a string
    pub fn extract_env_vars(&self, text: &str) -> Vec<String> {
        ENV_VAR_PATTERN
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ValidationErrorKind;

    #[test]
    fn test_env_var_extraction() {
        let validator = ConfigValidator::new();

        let text = "api_key: ${GEMINI_API_KEY}, url: ${GEMINI_BASE_URL}";
        let vars = validator.extract_env_vars(text);

        assert_eq!(vars, ["GEMINI_API_KEY", "GEMINI_BASE_URL"]);
    }

    #[test]
    fn test_valid_config_passes() {
        let config = AdapterConfig::new("key").with_prompt("storefront", "Be helpful.");
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }

    #[test]
    fn test_bad_base_url() {
        let mut config = AdapterConfig::new("key");
        config.provider.base_url = "not a url".into();

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "provider.base_url");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidUrl { .. }));
    }

    #[test]
    fn test_temperature_range() {
        let mut config = AdapterConfig::new("key");
        config.model.temperature = Some(2.5);

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "model.temperature");
    }

    #[test]
    fn test_empty_prompt_text() {
        let config = AdapterConfig::new("key").with_prompt("storefront", "  ");
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "prompts.storefront");
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = AdapterConfig::new("key");
        config.provider.timeout_secs = 0;
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "provider.timeout_secs");
    }
}
