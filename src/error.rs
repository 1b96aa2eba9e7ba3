// ABOUTME: Defines all error types for the crewline library using thiserror.
// ABOUTME: Each submodule has its own error enum, unified under CrewError.

use std::path::PathBuf;

/// Top-level error type for the crewline library.
#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("Missing parameter: {{{0}}}")]
    MissingParameter(String),
}

/// Errors from building or running a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Pipeline has no tasks")]
    Empty,

    #[error("Duplicate task id: {0}")]
    DuplicateNode(String),

    #[error("Duplicate agent id: {0}")]
    DuplicateAgent(String),

    #[error("Task '{node}' references unknown agent '{agent}'")]
    UnknownAgent { node: String, agent: String },

    #[error("Task '{node}' depends on unknown task '{dependency}'")]
    UnknownDependency { node: String, dependency: String },

    #[error("Task '{node}' lists dependency '{dependency}' more than once")]
    DuplicateDependency { node: String, dependency: String },

    #[error("Cyclic pipeline: {}", .cycle.join(" -> "))]
    Cyclic { cycle: Vec<String> },

    #[error("Task '{node}' is missing parameter {{{name}}}")]
    MissingParameter { node: String, name: String },

    #[error("Agent '{agent}' failed setup: {source}")]
    AgentSetup {
        agent: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Task '{node_id}' failed: {source}")]
    NodeExecution {
        node_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Run cancelled after {} completed task(s)", .completed.len())]
    Cancelled { completed: Vec<String> },
}

impl PipelineError {
    /// The task id this error is attributed to, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            PipelineError::NodeExecution { node_id, .. } => Some(node_id),
            PipelineError::MissingParameter { node, .. }
            | PipelineError::UnknownAgent { node, .. }
            | PipelineError::UnknownDependency { node, .. }
            | PipelineError::DuplicateDependency { node, .. } => Some(node),
            PipelineError::DuplicateNode(node) => Some(node),
            _ => None,
        }
    }
}

/// Errors from persisting a task result to its output file.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("Agent exceeded max iterations ({0})")]
    IterationLimit(usize),
}

/// Errors from tool operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

/// Errors from loading configuration or crew files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
