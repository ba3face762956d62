pub mod heuristic;

use crate::error::{AnalysisError, ConfigError};
use crate::types::change::FileChange;
use crate::types::report::AnalysisResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use utoipa::ToSchema;

pub use heuristic::HeuristicAnalysis;

/// Selects and parameterizes the analysis backend for one request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProviderConfig {
    pub provider: String,
    pub model: String,
    /// Opaque token handed through to collaborators. Excluded from Debug so
    /// it never reaches logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            credentials: None,
        }
    }
}

/// One file's analysis, performed by whatever backend the provider tag
/// resolved to. Implementations must not return partially-filled results: an
/// empty patch degrades to a generic clean result rather than an error.
#[async_trait]
pub trait AnalysisCapability: Send + Sync {
    async fn analyze(
        &self,
        change: &FileChange,
        config: &ProviderConfig,
        rules: &[String],
    ) -> Result<AnalysisResult, AnalysisError>;
}

/// Capability dispatch by provider tag, resolved once per request. New
/// backends register here instead of branching inside the orchestrator.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn AnalysisCapability>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in heuristic capability registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("heuristic", Arc::new(HeuristicAnalysis::new()));
        registry
    }

    pub fn register(&mut self, name: &str, capability: Arc<dyn AnalysisCapability>) {
        self.providers.insert(name.to_string(), capability);
    }

    pub fn resolve(
        &self,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn AnalysisCapability>, ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        self.providers
            .get(&config.provider)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownProvider {
                name: config.provider.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_provider() {
        let registry = ProviderRegistry::with_builtins();
        let config = ProviderConfig::new("heuristic", "builtin");
        assert!(registry.resolve(&config).is_ok());
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let registry = ProviderRegistry::with_builtins();
        let config = ProviderConfig::new("gpt-x", "whatever");
        assert!(matches!(
            registry.resolve(&config),
            Err(ConfigError::UnknownProvider { name }) if name == "gpt-x"
        ));
    }

    #[test]
    fn empty_registry_reports_no_providers() {
        let registry = ProviderRegistry::new();
        let config = ProviderConfig::new("heuristic", "builtin");
        assert!(matches!(
            registry.resolve(&config),
            Err(ConfigError::NoProviders)
        ));
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = ProviderConfig {
            credentials: Some("glpat-secret".to_string()),
            ..ProviderConfig::new("heuristic", "builtin")
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("glpat-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
