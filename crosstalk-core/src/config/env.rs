//! Environment variable interpolation for configuration

use super::error::ConfigError;
use regex::{Captures, Regex};
use std::env;
use std::sync::LazyLock;

/// `${VAR}` reference with an upper-case variable name
pub(super) static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Interpolate `${VAR}` references in a configuration string
///
/// Fails on the first referenced variable that is not set.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    if let Some(var) = ENV_VAR_PATTERN
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .find(|name| env::var(name).is_err())
    {
        return Err(ConfigError::EnvVarNotFound { var });
    }

    let result = ENV_VAR_PATTERN.replace_all(content, |cap: &Captures<'_>| {
        env::var(&cap[1]).unwrap_or_default()
    });
    Ok(result.into_owned())
}
