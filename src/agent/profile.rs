// ABOUTME: AgentProfile - the static persona a task is assigned to: role, goal,
// ABOUTME: backstory, model, tool names, iteration limit and cache flag.

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::template::{self, Inputs};

fn default_cache() -> bool {
    true
}

/// Declarative description of an agent.
///
/// Role, goal and backstory may contain `{name}` placeholders that are
/// filled from the run's input bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Identifier tasks use to reference this agent.
    pub id: String,

    pub role: String,

    pub goal: String,

    pub backstory: String,

    /// Model identifier such as `groq/llama3-70b-8192` or `gpt-4o-mini`.
    /// None uses the configured default.
    #[serde(default, rename = "llm", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Names of tools this agent may call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,

    /// Maximum think-act iterations per task. None means unbounded.
    #[serde(default, rename = "max_iter", skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,

    /// Reuse results of identical tool calls.
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl AgentProfile {
    /// Create a profile with required fields; no tools, unbounded, cached.
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            model: None,
            tools: Vec::new(),
            max_iterations: None,
            cache: true,
        }
    }

    /// Set the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the tools this agent may call.
    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Limit think-act iterations. Zero is treated as one.
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max.max(1));
        self
    }

    /// Enable or disable the tool result cache.
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Placeholders referenced by role, goal or backstory.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for text in [&self.role, &self.goal, &self.backstory] {
            for name in template::placeholders(text) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Copy of this profile with role, goal and backstory filled from `inputs`.
    pub fn render(&self, inputs: &Inputs) -> Result<AgentProfile, TemplateError> {
        Ok(AgentProfile {
            role: template::render(&self.role, inputs)?,
            goal: template::render(&self.goal, inputs)?,
            backstory: template::render(&self.backstory, inputs)?,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let agent = AgentProfile::new(
            "content_explorer",
            "data researcher",
            "Gather and provide latest information about the topic from internet",
            "You are an expert researcher.",
        )
        .model("gpt-4o-mini")
        .tools(["duckduckgo_search"])
        .max_iterations(5)
        .cache(true);

        assert_eq!(agent.id, "content_explorer");
        assert_eq!(agent.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(agent.tools, vec!["duckduckgo_search"]);
        assert_eq!(agent.max_iterations, Some(5));
        assert!(agent.cache);
    }

    #[test]
    fn test_defaults() {
        let agent = AgentProfile::new("a", "r", "g", "b");
        assert!(agent.model.is_none());
        assert!(agent.tools.is_empty());
        assert!(agent.max_iterations.is_none());
        assert!(agent.cache);
        assert_eq!(agent.max_iterations(0).max_iterations, Some(1));
    }

    #[test]
    fn test_render_goal() {
        let agent = AgentProfile::new(
            "explorer",
            "Data Explorer",
            "Research, gather and provide information about the topic : {topic}",
            "You are an expert researcher",
        );
        let inputs = Inputs::from([("topic".to_string(), "AI".to_string())]);

        assert_eq!(agent.placeholders(), vec!["topic"]);
        let rendered = agent.render(&inputs).unwrap();
        assert_eq!(
            rendered.goal,
            "Research, gather and provide information about the topic : AI"
        );
        assert_eq!(rendered.id, "explorer");
    }

    #[test]
    fn test_render_missing() {
        let agent = AgentProfile::new("bot", "Responder", "Provide a response to {query}", "");
        let err = agent.render(&Inputs::new()).unwrap_err();
        assert_eq!(err, TemplateError::MissingParameter("query".into()));
    }

    #[test]
    fn test_deserialize_uses_crew_field_names() {
        let agent: AgentProfile = toml::from_str(
            r#"
            id = "fin_expert"
            role = "Financial Expert"
            goal = "Make investment recommendation"
            backstory = "You are an expert financial advisor"
            llm = "gpt-4o-mini"
            tools = ["get_current_stock_price"]
            max_iter = 5
            "#,
        )
        .unwrap();

        assert_eq!(agent.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(agent.max_iterations, Some(5));
        assert!(agent.cache);
    }
}
