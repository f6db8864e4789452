//! System prompt lookup

use crate::config::AdapterConfig;
use std::collections::HashMap;

/// Resolves a system prompt key to its instruction text
pub trait PromptResolver: Send + Sync {
    /// The instruction text registered under `key`, if any
    fn resolve(&self, key: &str) -> Option<String>;
}

/// In-memory prompt table
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    prompts: HashMap<String, String>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prompt, replacing any previous text under the same key
    pub fn with_prompt(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.prompts.insert(key.into(), text.into());
        self
    }

    /// Registry holding the prompts of a configuration
    pub fn from_config(config: &AdapterConfig) -> Self {
        Self {
            prompts: config.prompts.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl PromptResolver for PromptRegistry {
    fn resolve(&self, key: &str) -> Option<String> {
        self.prompts.get(key).cloned()
    }
}

impl<F> PromptResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, key: &str) -> Option<String> {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = PromptRegistry::new().with_prompt("storefront", "You help shoppers.");
        assert_eq!(registry.resolve("storefront").as_deref(), Some("You help shoppers."));
        assert_eq!(registry.resolve("checkout"), None);
    }

    #[test]
    fn test_registry_from_config() {
        let config = AdapterConfig::new("key").with_prompt("storefront", "Be brief.");
        let registry = PromptRegistry::from_config(&config);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("storefront").as_deref(), Some("Be brief."));
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |key: &str| (key == "default").then(|| "Hello".to_string());
        assert_eq!(resolver.resolve("default").as_deref(), Some("Hello"));
        assert!(PromptResolver::resolve(&resolver, "other").is_none());
    }
}
