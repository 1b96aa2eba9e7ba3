// ABOUTME: Process-wide configuration - provider credentials, default model,
// ABOUTME: task timeout and output directory, read once from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::llm::OLLAMA_BASE_URL;

/// Model used when an agent does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Settings established before any run and read-only afterwards.
///
/// Environment variables:
/// - `OPENAI_API_KEY`, `GROQ_API_KEY`, `OPENROUTER_API_KEY` (optional)
/// - `OPENAI_BASE_URL` (optional, OpenAI-compatible gateway)
/// - `OLLAMA_BASE_URL` (optional, default: `http://localhost:11434/v1`)
/// - `CREWLINE_DEFAULT_MODEL` (optional, default: `gpt-4o-mini`)
/// - `CREWLINE_NODE_TIMEOUT_SECS` (optional, no timeout when unset)
/// - `CREWLINE_OUTPUT_DIR` (optional, root for relative output files)
#[derive(Debug, Clone)]
pub struct CrewConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub groq_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub ollama_base_url: String,
    pub default_model: String,
    pub node_timeout: Option<Duration>,
    pub output_dir: Option<PathBuf>,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            groq_api_key: None,
            openrouter_api_key: None,
            ollama_base_url: OLLAMA_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            node_timeout: None,
            output_dir: None,
        }
    }
}

impl CrewConfig {
    /// Read configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let node_timeout = match get("CREWLINE_NODE_TIMEOUT_SECS") {
            None => None,
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: "CREWLINE_NODE_TIMEOUT_SECS".to_string(),
                        value: raw.clone(),
                    })?;
                Some(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            groq_api_key: get("GROQ_API_KEY"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            ollama_base_url: get("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            default_model: get("CREWLINE_DEFAULT_MODEL").unwrap_or(defaults.default_model),
            node_timeout,
            output_dir: get("CREWLINE_OUTPUT_DIR").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = CrewConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.openai_api_key.is_none());
        assert!(config.groq_api_key.is_none());
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.ollama_base_url, OLLAMA_BASE_URL);
        assert!(config.node_timeout.is_none());
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_reads_all_keys() {
        let config = CrewConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("GROQ_API_KEY", "gsk-1"),
            ("CREWLINE_DEFAULT_MODEL", "groq/llama3-70b-8192"),
            ("CREWLINE_NODE_TIMEOUT_SECS", "90"),
            ("CREWLINE_OUTPUT_DIR", "reports"),
        ]))
        .unwrap();

        assert_eq!(config.openai_api_key.as_deref(), Some("sk-1"));
        assert_eq!(config.groq_api_key.as_deref(), Some("gsk-1"));
        assert_eq!(config.default_model, "groq/llama3-70b-8192");
        assert_eq!(config.node_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.output_dir, Some(PathBuf::from("reports")));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = CrewConfig::from_lookup(lookup(&[("GROQ_API_KEY", "  ")])).unwrap();
        assert!(config.groq_api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        let err =
            CrewConfig::from_lookup(lookup(&[("CREWLINE_NODE_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "CREWLINE_NODE_TIMEOUT_SECS"));

        assert!(CrewConfig::from_lookup(lookup(&[("CREWLINE_NODE_TIMEOUT_SECS", "0")])).is_err());
    }
}
