// ABOUTME: Model identifiers ("groq/llama3-70b-8192", "gpt-4o-mini") and the
// ABOUTME: per-provider client table built once from process configuration.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::client::LlmClient;
use super::openai::{OPENAI_BASE_URL, OpenAIClient};
use crate::config::CrewConfig;
use crate::error::LlmError;

/// Base URL for Groq's OpenAI-compatible API.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Base URL for OpenRouter's OpenAI-compatible API.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default base URL for a local Ollama server.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

/// A chat-completions provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Groq,
    OpenRouter,
    Ollama,
}

impl Provider {
    /// Prefix used in model identifiers.
    pub fn prefix(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Groq => "groq",
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
        }
    }

    /// Environment variable holding this provider's API key, if it needs one.
    pub fn key_var(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::OpenRouter => Some("OPENROUTER_API_KEY"),
            Provider::Ollama => None,
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "openai" => Some(Provider::OpenAI),
            "groq" => Some(Provider::Groq),
            "openrouter" => Some(Provider::OpenRouter),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }
}

/// A provider plus the model name that provider understands.
///
/// A bare name such as `gpt-4o-mini` means OpenAI. OpenRouter model names
/// keep their own slash: `openrouter/meta-llama/llama-3-70b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    pub provider: Provider,
    pub model: String,
}

impl ModelId {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

impl FromStr for ModelId {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            None if s.is_empty() => Err(LlmError::Configuration(
                "empty model identifier".to_string(),
            )),
            None => Ok(ModelId::new(Provider::OpenAI, s)),
            Some((prefix, model)) => {
                let provider = Provider::from_prefix(prefix)
                    .ok_or_else(|| LlmError::UnknownProvider(prefix.to_string()))?;
                if model.is_empty() {
                    return Err(LlmError::Configuration(format!(
                        "model identifier '{}' has no model name",
                        s
                    )));
                }
                Ok(ModelId::new(provider, model))
            }
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider.prefix(), self.model)
    }
}

/// Clients for every provider with usable credentials.
///
/// Built once at startup; lookups never mutate.
#[derive(Clone, Default)]
pub struct ProviderClients {
    clients: HashMap<Provider, Arc<dyn LlmClient>>,
}

impl ProviderClients {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build clients for every provider the configuration has credentials for.
    pub fn from_config(config: &CrewConfig) -> Self {
        let mut table = Self::new();

        if let Some(key) = &config.openai_api_key {
            let base = config
                .openai_base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string());
            table = table.with(
                Provider::OpenAI,
                Arc::new(OpenAIClient::new(key.clone()).with_base_url(base)),
            );
        }
        if let Some(key) = &config.groq_api_key {
            table = table.with(
                Provider::Groq,
                Arc::new(OpenAIClient::new(key.clone()).with_base_url(GROQ_BASE_URL)),
            );
        }
        if let Some(key) = &config.openrouter_api_key {
            table = table.with(
                Provider::OpenRouter,
                Arc::new(OpenAIClient::new(key.clone()).with_base_url(OPENROUTER_BASE_URL)),
            );
        }
        table.with(
            Provider::Ollama,
            Arc::new(OpenAIClient::without_key(config.ollama_base_url.clone())),
        )
    }

    /// Register or replace the client for a provider.
    pub fn with(mut self, provider: Provider, client: Arc<dyn LlmClient>) -> Self {
        self.clients.insert(provider, client);
        self
    }

    /// Look up the client serving a model.
    pub fn client_for(&self, model: &ModelId) -> Result<Arc<dyn LlmClient>, LlmError> {
        self.clients
            .get(&model.provider)
            .cloned()
            .ok_or_else(|| match model.provider.key_var() {
                Some(var) => LlmError::Configuration(format!(
                    "{} is not set; cannot use model '{}'",
                    var, model
                )),
                None => LlmError::Configuration(format!("no client for model '{}'", model)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixed_model() {
        let id: ModelId = "groq/llama3-70b-8192".parse().unwrap();
        assert_eq!(id.provider, Provider::Groq);
        assert_eq!(id.model, "llama3-70b-8192");
        assert_eq!(id.to_string(), "groq/llama3-70b-8192");
    }

    #[test]
    fn test_parse_bare_model_means_openai() {
        let id: ModelId = "gpt-4o-mini".parse().unwrap();
        assert_eq!(id, ModelId::new(Provider::OpenAI, "gpt-4o-mini"));
    }

    #[test]
    fn test_parse_openrouter_keeps_inner_slash() {
        let id: ModelId = "openrouter/meta-llama/llama-3-70b".parse().unwrap();
        assert_eq!(id.provider, Provider::OpenRouter);
        assert_eq!(id.model, "meta-llama/llama-3-70b");
    }

    #[test]
    fn test_parse_unknown_provider() {
        let err = "mystery/model".parse::<ModelId>().unwrap_err();
        assert!(matches!(err, LlmError::UnknownProvider(p) if p == "mystery"));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!("".parse::<ModelId>().is_err());
        assert!("groq/".parse::<ModelId>().is_err());
    }

    #[test]
    fn test_client_table_reports_missing_key() {
        let config = CrewConfig::default();
        let clients = ProviderClients::from_config(&config);

        let err = clients
            .client_for(&ModelId::new(Provider::Groq, "llama3-70b-8192"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("GROQ_API_KEY"));

        // Ollama needs no key.
        assert!(
            clients
                .client_for(&ModelId::new(Provider::Ollama, "llama3"))
                .is_ok()
        );
    }

    #[test]
    fn test_client_table_with_keys() {
        let config = CrewConfig {
            openai_api_key: Some("sk-test".into()),
            groq_api_key: Some("gsk-test".into()),
            ..CrewConfig::default()
        };
        let clients = ProviderClients::from_config(&config);
        assert!(clients.client_for(&"gpt-4o-mini".parse().unwrap()).is_ok());
        assert!(
            clients
                .client_for(&"groq/llama3-70b-8192".parse().unwrap())
                .is_ok()
        );
        assert!(
            clients
                .client_for(&"openrouter/x/y".parse().unwrap())
                .is_err()
        );
    }
}
