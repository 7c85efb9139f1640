//! Prompt template loading and rendering via `minijinja`.
//!
//! Each language ships four built-in templates: a system and a user
//! template for decisions, and the same pair for the nightly reflection.
//! Operators can override any of them without recompiling by dropping a
//! file with the same name into `llm.templates_dir`:
//!
//! - `decision_system.j2`
//! - `decision_user.j2` -- receives `perception_text`, `memory_context`,
//!   `stats_json`, and `actions` (a list of `{name, label}`)
//! - `reflection_system.j2`
//! - `reflection_user.j2` -- receives `daily_log`

use std::path::Path;

use minijinja::{Environment, context};
use serde::Serialize;
use soul_types::{ActionType, AgentStats, Language};
use tracing::debug;

use crate::error::RunnerError;

/// Names of the four templates.
pub const TEMPLATE_NAMES: [&str; 4] = [
    "decision_system.j2",
    "decision_user.j2",
    "reflection_system.j2",
    "reflection_user.j2",
];

const EN_TEMPLATES: [&str; 4] = [
    "You are a digital soul making decisions in a virtual world. Respond with JSON only.",
    r#"You are a digital soul in a virtual world.

Current Situation:
{{ perception_text }}

Your Memories:
{{ memory_context }}

Your Stats:
{{ stats_json }}

Available Actions:
{% for action in actions %}- {{ action.name }}: {{ action.label }}
{% endfor %}
Decide your next action. Respond with JSON:
{
  "action": "ACTION_NAME",
  "target": {"x": 0, "y": 0} or {"entity_id": "..."} or null,
  "thought": "your reasoning"
}
A coordinate target moves you one step; it must be adjacent to where you stand."#,
    "You are a reflective digital soul.",
    "Today's log:\n{{ daily_log }}\n\nReflect on your day and state your updated values in one or two sentences.",
];

const ZH_TEMPLATES: [&str; 4] = [
    "你是一个在虚拟世界中做出决策的数字灵魂。请仅以 JSON 格式回复。",
    r#"你是一个虚拟世界中的数字灵魂。

当前处境：
{{ perception_text }}

你的记忆：
{{ memory_context }}

你的状态：
{{ stats_json }}

可选动作：
{% for action in actions %}- {{ action.name }}: {{ action.label }}
{% endfor %}
请决定你的下一个动作。以 JSON 格式回复：
{
  "action": "动作名称",
  "target": {"x": 0, "y": 0} 或 {"entity_id": "..."} 或 null,
  "thought": "你的内心独白"
}
坐标目标只会让你移动一步，必须与你当前所在位置相邻。"#,
    "你是一个善于反思的数字灵魂。",
    "今日日志：\n{{ daily_log }}\n\n反思你的一天，并用一两句话说明你更新后的价值观。",
];

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System message.
    pub system: String,
    /// User message.
    pub user: String,
}

#[derive(Serialize)]
struct ActionOption {
    name: &'static str,
    label: &'static str,
}

/// Holds the loaded templates for one language.
pub struct PromptEngine {
    env: Environment<'static>,
    language: Language,
}

impl PromptEngine {
    /// Load the built-in templates for `language`, replacing any that exist
    /// as files in `templates_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if an override file cannot be read
    /// or any template fails to compile.
    pub fn new(language: Language, templates_dir: Option<&Path>) -> Result<Self, RunnerError> {
        let builtin = match language {
            Language::En => EN_TEMPLATES,
            Language::Zh => ZH_TEMPLATES,
        };

        let mut env = Environment::new();
        for (name, source) in TEMPLATE_NAMES.into_iter().zip(builtin) {
            let source = match templates_dir.map(|dir| dir.join(name)) {
                Some(path) if path.is_file() => {
                    debug!(template = name, path = %path.display(), "loading template override");
                    std::fs::read_to_string(&path).map_err(|e| {
                        RunnerError::Template(format!("failed to read {}: {e}", path.display()))
                    })?
                }
                _ => source.to_owned(),
            };
            env.add_template_owned(name, source)
                .map_err(|e| RunnerError::Template(format!("failed to add {name}: {e}")))?;
        }

        Ok(Self { env, language })
    }

    /// The language the built-in templates are written in.
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Render the decision prompt.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if rendering fails, or
    /// [`RunnerError::Serde`] if the stats cannot be serialized.
    pub fn render_decision(
        &self,
        perception_text: &str,
        memory_context: &str,
        stats: &AgentStats,
    ) -> Result<RenderedPrompt, RunnerError> {
        let stats_json = serde_json::to_string_pretty(stats)?;
        let actions: Vec<ActionOption> = ActionType::ALL
            .into_iter()
            .map(|action| ActionOption {
                name: action.as_str(),
                label: action.display_name(self.language),
            })
            .collect();

        let system = self.render("decision_system.j2", context! {})?;
        let user = self.render(
            "decision_user.j2",
            context! {
                perception_text,
                memory_context,
                stats_json,
                actions,
            },
        )?;
        Ok(RenderedPrompt { system, user })
    }

    /// Render the reflection prompt.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if rendering fails.
    pub fn render_reflection(&self, daily_log: &str) -> Result<RenderedPrompt, RunnerError> {
        let system = self.render("reflection_system.j2", context! {})?;
        let user = self.render("reflection_user.j2", context! { daily_log })?;
        Ok(RenderedPrompt { system, user })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, RunnerError> {
        self.env
            .get_template(name)
            .map_err(|e| RunnerError::Template(format!("missing {name}: {e}")))?
            .render(ctx)
            .map_err(|e| RunnerError::Template(format!("{name} render failed: {e}")))
    }
}
