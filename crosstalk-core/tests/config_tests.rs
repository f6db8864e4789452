//! Integration tests for configuration loading and validation

use crosstalk_core::config::{
    load_from_json, load_from_yaml, AdapterConfig, ConfigError, SafeLogging, DEFAULT_BASE_URL,
};
use crosstalk_core::{AdapterError, ConversationAdapter};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a test config file
fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_valid_yaml_config() {
    std::env::set_var("CROSSTALK_YAML_KEY", "yaml-secret-key");

    let yaml = r#"
provider:
  api_key: ${CROSSTALK_YAML_KEY}
  timeout_secs: 20
model:
  id: gemini-1.5-flash
  temperature: 0.3
prompts:
  storefront: You help shoppers find products.
  returns: You explain the returns policy.
"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", yaml);

    let config = load_from_yaml(path).unwrap();
    assert_eq!(config.provider.api_key.expose_secret(), "yaml-secret-key");
    assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.provider.timeout_secs, 20);
    assert_eq!(config.model.id, "gemini-1.5-flash");
    assert_eq!(config.model.temperature, Some(0.3));
    assert_eq!(config.prompts.len(), 2);

    std::env::remove_var("CROSSTALK_YAML_KEY");
}

#[test]
fn test_load_valid_json_config() {
    std::env::set_var("CROSSTALK_JSON_KEY", "json-secret-key");

    let json = r#"{
  "provider": {
    "api_key": "${CROSSTALK_JSON_KEY}",
    "base_url": "http://localhost:8080/v1beta"
  },
  "prompts": {"storefront": "You help shoppers."}
}"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.json", json);

    let config = load_from_json(path).unwrap();
    assert_eq!(config.provider.api_key.expose_secret(), "json-secret-key");
    assert_eq!(config.provider.base_url, "http://localhost:8080/v1beta");
    assert_eq!(config.prompts["storefront"], "You help shoppers.");

    std::env::remove_var("CROSSTALK_JSON_KEY");
}

#[test]
fn test_missing_env_var() {
    let yaml = r#"
provider:
  api_key: ${CROSSTALK_NEVER_SET_KEY}
"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", yaml);

    match load_from_yaml(path) {
        Err(ConfigError::EnvVarNotFound { var }) => assert_eq!(var, "CROSSTALK_NEVER_SET_KEY"),
        other => panic!("Expected EnvVarNotFound, got {:?}", other),
    }
}

#[test]
fn test_parse_error_reports_location() {
    let yaml = "provider:\n  api_key: [unclosed\n";

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "broken.yaml", yaml);

    match load_from_yaml(&path) {
        Err(ConfigError::ParseError { path: reported, .. }) => {
            assert!(reported.ends_with("broken.yaml"))
        }
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_validation_rejects_bad_temperature() {
    let yaml = r#"
provider:
  api_key: test-key
model:
  temperature: 3.5
"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", yaml);

    match load_from_yaml(path) {
        Err(ConfigError::ValidationError(err)) => assert_eq!(err.field_path, "model.temperature"),
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let result = load_from_json("/nonexistent/crosstalk.json");
    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}

#[test]
fn test_adapter_construction_requires_key() {
    let config = AdapterConfig::new("   ");
    assert!(matches!(
        ConversationAdapter::from_config(&config),
        Err(AdapterError::Configuration(_))
    ));

    let config = AdapterConfig::new("a-real-looking-key").with_prompt("storefront", "Hi");
    let adapter = ConversationAdapter::from_config(&config).unwrap();
    assert_eq!(adapter.model().id, config.model.id);
}

#[test]
fn test_config_logging_is_redacted() {
    let config = AdapterConfig::new("AIzaSyExampleSecretValue1234");
    let logged = format!("{} {:?}", config.safe_debug(), config);

    assert!(!logged.contains("ExampleSecretValue"));
    assert!(logged.contains("AIza...1234"));
}
