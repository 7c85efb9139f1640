//! [`Brain`] implementation backed by an LLM.
//!
//! One decision is one round trip: render the prompt, call the backend,
//! parse the reply. Timeouts and retries are the caller's business (the
//! agent controller wraps every call in its deadline), so this type never
//! sleeps or loops.

use std::sync::Arc;

use async_trait::async_trait;
use soul_core::config::LlmConfig;
use soul_core::{Brain, DecisionError, RuleBrain};
use soul_types::{AgentStats, Decision, Language};
use tracing::{debug, info, warn};

use crate::config::LlmBackendConfig;
use crate::error::RunnerError;
use crate::llm::{Completion, LlmBackend, create_backend};
use crate::parse::parse_decision;
use crate::prompt::PromptEngine;

/// Decides and reflects by asking an LLM.
pub struct LlmBrain {
    backend: LlmBackend,
    prompts: PromptEngine,
    temperature: f64,
    reflection_temperature: f64,
}

impl LlmBrain {
    /// Assemble a brain from a backend and a prompt engine.
    pub const fn new(
        backend: LlmBackend,
        prompts: PromptEngine,
        temperature: f64,
        reflection_temperature: f64,
    ) -> Self {
        Self {
            backend,
            prompts,
            temperature,
            reflection_temperature,
        }
    }

    /// Build from a resolved backend configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if the prompt templates fail to
    /// load.
    pub fn from_backend_config(
        config: &LlmBackendConfig,
        language: Language,
        templates_dir: Option<&std::path::Path>,
    ) -> Result<Self, RunnerError> {
        let prompts = PromptEngine::new(language, templates_dir)?;
        Ok(Self::new(
            create_backend(config),
            prompts,
            config.temperature,
            config.reflection_temperature,
        ))
    }

    /// Name of the backend, for logging.
    pub const fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    async fn try_decide(
        &self,
        perception: &str,
        memory: &str,
        stats: &AgentStats,
    ) -> Result<Decision, RunnerError> {
        let prompt = self.prompts.render_decision(perception, memory, stats)?;
        let options = Completion {
            temperature: self.temperature,
            json: true,
        };
        let raw = self.backend.complete(&prompt, options).await?;
        debug!(backend = self.backend.name(), response = %raw, "LLM decision received");
        parse_decision(&raw).inspect_err(|e| {
            warn!(backend = self.backend.name(), error = %e, raw_response = %raw, "unusable LLM decision");
        })
    }

    async fn try_reflect(&self, daily_log: &str) -> Result<String, RunnerError> {
        let prompt = self.prompts.render_reflection(daily_log)?;
        let options = Completion {
            temperature: self.reflection_temperature,
            json: false,
        };
        let raw = self.backend.complete(&prompt, options).await?;
        let reflection = raw.trim();
        if reflection.is_empty() {
            return Err(RunnerError::Parse("empty reflection".to_owned()));
        }
        Ok(reflection.to_owned())
    }
}

#[async_trait]
impl Brain for LlmBrain {
    async fn decide(
        &self,
        perception: &str,
        memory: &str,
        stats: &AgentStats,
    ) -> Result<Decision, DecisionError> {
        Ok(self.try_decide(perception, memory, stats).await?)
    }

    async fn reflect(&self, daily_log: &str) -> Result<String, DecisionError> {
        Ok(self.try_reflect(daily_log).await?)
    }
}

/// Build the brain selected by `config.backend`: a [`RuleBrain`] for
/// `rule`, an [`LlmBrain`] otherwise.
///
/// # Errors
///
/// Returns [`RunnerError::Config`] for an unknown backend and
/// [`RunnerError::Template`] for unusable template overrides.
pub fn build_brain(config: &LlmConfig, language: Language) -> Result<Arc<dyn Brain>, RunnerError> {
    match LlmBackendConfig::from_llm_config(config)? {
        None => {
            info!(language = language.code(), "using rule-based brain");
            Ok(Arc::new(RuleBrain::new(language)))
        }
        Some(backend) => {
            let brain =
                LlmBrain::from_backend_config(&backend, language, config.templates_dir.as_deref())?;
            info!(
                backend = brain.backend_name(),
                url = %backend.api_url,
                model = %backend.model,
                language = language.code(),
                "using LLM brain"
            );
            Ok(Arc::new(brain))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use soul_types::ActionType;

    use super::*;
    use crate::config::BackendType;

    /// Last request body seen by the mock server, and the canned reply.
    #[derive(Clone)]
    struct Mock {
        seen: Arc<Mutex<Option<serde_json::Value>>>,
        reply: serde_json::Value,
    }

    async fn chat(
        State(mock): State<Mock>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        *mock.seen.lock().unwrap() = Some(body);
        Json(mock.reply.clone())
    }

    /// Serve `reply` on `/chat/completions` and `/messages`; return the base URL.
    async fn serve(reply: serde_json::Value) -> (String, Arc<Mutex<Option<serde_json::Value>>>) {
        let seen = Arc::new(Mutex::new(None));
        let app = Router::new()
            .route("/chat/completions", post(chat))
            .route("/messages", post(chat))
            .with_state(Mock {
                seen: Arc::clone(&seen),
                reply,
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        (format!("http://{addr}"), seen)
    }

    fn backend(kind: BackendType, url: String) -> LlmBackendConfig {
        LlmBackendConfig {
            backend_type: kind,
            api_url: url,
            api_key: "test-key".to_owned(),
            model: "test-model".to_owned(),
            temperature: 0.7,
            reflection_temperature: 0.8,
        }
    }

    #[tokio::test]
    async fn openai_decision_round_trip() {
        let reply = serde_json::json!({
            "choices": [{"message": {"content":
                "{\"action\": \"WORK_965\", \"target\": {\"x\": 1, \"y\": 2}, \"thought\": \"Steady pay.\"}"
            }}]
        });
        let (url, seen) = serve(reply).await;
        let brain =
            LlmBrain::from_backend_config(&backend(BackendType::OpenAi, url), Language::En, None)
                .unwrap();

        let decision = brain
            .decide("You are home.", "Thought: hmm", &AgentStats::default())
            .await
            .unwrap();
        assert_eq!(decision.action, ActionType::Work965);
        assert_eq!(decision.thought, "Steady pay.");

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["response_format"]["type"], "json_object");
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("You are home."));
    }

    #[tokio::test]
    async fn anthropic_reflection_round_trip() {
        let reply = serde_json::json!({
            "content": [{"type": "text", "text": "  Rest is part of work.\n"}]
        });
        let (url, seen) = serve(reply).await;
        let brain =
            LlmBrain::from_backend_config(&backend(BackendType::Anthropic, url), Language::En, None)
                .unwrap();

        let values = brain.reflect("[09:00] worked\n").await.unwrap();
        assert_eq!(values, "Rest is part of work.");

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["system"], "You are a reflective digital soul.");
        assert!(body.get("response_format").is_none());
    }

    #[tokio::test]
    async fn malformed_reply_is_malformed() {
        let reply = serde_json::json!({
            "choices": [{"message": {"content": "{\"action\": \"FLY\", \"thought\": \"wheee\"}"}}]
        });
        let (url, _) = serve(reply).await;
        let brain =
            LlmBrain::from_backend_config(&backend(BackendType::OpenAi, url), Language::En, None)
                .unwrap();

        let err = brain.decide("", "", &AgentStats::default()).await.unwrap_err();
        assert!(matches!(err, DecisionError::Malformed { .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        // Nothing listens on port 9 (discard) in the test environment.
        let brain = LlmBrain::from_backend_config(
            &backend(BackendType::OpenAi, "http://127.0.0.1:9".to_owned()),
            Language::En,
            None,
        )
        .unwrap();
        let err = brain.decide("", "", &AgentStats::default()).await.unwrap_err();
        assert!(matches!(err, DecisionError::Unavailable { .. }));
    }

    #[test]
    fn rule_backend_builds_rule_brain() {
        assert!(build_brain(&LlmConfig::default(), Language::Zh).is_ok());
        let bad = LlmConfig {
            backend: "telepathy".to_owned(),
            ..LlmConfig::default()
        };
        assert!(build_brain(&bad, Language::En).is_err());
    }
}
