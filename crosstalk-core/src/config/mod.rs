//! Configuration module for Crosstalk
//!
//! Adapter configuration is read from YAML or JSON files with `${VAR}`
//! interpolation, or straight from the process environment via
//! [`AdapterConfig::from_env`].

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{AdapterConfig, ModelSettings, ProviderConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use secrets::{SafeLogging, SecretString};
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<AdapterConfig> {
    let path = path.as_ref();
    let content = read_config(path)?;

    let config: AdapterConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    tracing::debug!(config = %config.safe_for_logging(), "loaded configuration");
    Ok(config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<AdapterConfig> {
    let path = path.as_ref();
    let content = read_config(path)?;

    let config: AdapterConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    tracing::debug!(config = %config.safe_for_logging(), "loaded configuration");
    Ok(config)
}

/// Read a file and interpolate environment variables before parsing
fn read_config(path: &Path) -> ConfigResult<String> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    env::interpolate_env_vars(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
provider:
  api_key: test-key
  base_url: http://localhost:8080/v1beta
  timeout_secs: 30
model:
  id: gemini-1.5-pro
  temperature: 0.4
  max_output_tokens: 1024
prompts:
  storefront: You help shoppers find products.
"#;
        let config: AdapterConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model.id, "gemini-1.5-pro");
        assert_eq!(config.model.max_output_tokens, Some(1024));
        assert_eq!(config.prompts["storefront"], "You help shoppers find products.");
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }
}
