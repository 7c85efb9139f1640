//! Backend selection for the LLM brain.
//!
//! The `llm` section of `soul-config.yaml` (after `LLM_*` environment
//! overrides) names a backend and how to reach it. `rule` means no LLM at
//! all; `openai` covers every OpenAI-compatible endpoint (`OpenAI`,
//! `DeepSeek`, Ollama); `anthropic` is the Messages API.

use soul_core::config::LlmConfig;

use crate::error::RunnerError;

/// Default base URL for the `openai` backend.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Default base URL for the `anthropic` backend.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible API (works with `OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API (different request format).
    Anthropic,
}

impl BackendType {
    /// Default base URL for this backend.
    pub const fn default_url(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_API_URL,
            Self::Anthropic => ANTHROPIC_API_URL,
        }
    }
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmBackendConfig {
    /// The backend type.
    pub backend_type: BackendType,
    /// Base API URL without a trailing slash (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication. Empty for keyless local endpoints.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature for decisions.
    pub temperature: f64,
    /// Sampling temperature for reflections.
    pub reflection_temperature: f64,
}

impl LlmBackendConfig {
    /// Resolve the backend named in `config`.
    ///
    /// Returns `Ok(None)` for the `rule` backend.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] for an unknown backend name.
    pub fn from_llm_config(config: &LlmConfig) -> Result<Option<Self>, RunnerError> {
        let backend_type = match config.backend.trim().to_ascii_lowercase().as_str() {
            "rule" | "mock" => return Ok(None),
            "openai" | "deepseek" | "ollama" => BackendType::OpenAi,
            "anthropic" => BackendType::Anthropic,
            other => {
                return Err(RunnerError::Config(format!(
                    "unknown llm backend '{other}', expected rule, openai or anthropic"
                )));
            }
        };

        let default_url = backend_type.default_url();
        let api_url = config
            .api_url
            .as_deref()
            .unwrap_or(default_url)
            .trim_end_matches('/')
            .to_owned();

        Ok(Some(Self {
            backend_type,
            api_url,
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            temperature: config.temperature,
            reflection_temperature: config.reflection_temperature,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn llm(backend: &str) -> LlmConfig {
        LlmConfig {
            backend: backend.to_owned(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn rule_backend_needs_no_llm() {
        assert_eq!(LlmBackendConfig::from_llm_config(&llm("rule")).unwrap(), None);
    }

    #[test]
    fn openai_defaults_to_public_endpoint() {
        let config = LlmBackendConfig::from_llm_config(&llm("OpenAI")).unwrap().unwrap();
        assert_eq!(config.backend_type, BackendType::OpenAi);
        assert_eq!(config.api_url, OPENAI_API_URL);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn custom_url_loses_trailing_slash() {
        let mut cfg = llm("anthropic");
        cfg.api_url = Some("http://localhost:9000/v1/".to_owned());
        cfg.api_key = Some("k".to_owned());
        let config = LlmBackendConfig::from_llm_config(&cfg).unwrap().unwrap();
        assert_eq!(config.backend_type, BackendType::Anthropic);
        assert_eq!(config.api_url, "http://localhost:9000/v1");
        assert_eq!(config.api_key, "k");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(matches!(
            LlmBackendConfig::from_llm_config(&llm("gemini")),
            Err(RunnerError::Config(_))
        ));
    }
}
