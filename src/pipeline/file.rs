// ABOUTME: Crew files - declarative TOML descriptions of agents and tasks that
// ABOUTME: load into a validated PipelineDefinition.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{PipelineBuilder, PipelineDefinition, TaskNode};
use crate::agent::AgentProfile;
use crate::error::{ConfigError, CrewError, PipelineError};

/// A crew as written in a TOML file.
///
/// ```toml
/// [[agents]]
/// id = "explorer"
/// role = "Data Explorer"
/// goal = "Research the topic: {topic}"
/// backstory = "You are an expert researcher"
/// tools = ["duckduckgo_search"]
///
/// [[tasks]]
/// id = "explore"
/// description = "Research {topic}"
/// expected_output = "A short report"
/// agent = "explorer"
/// output_file = "report.md"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub agents: Vec<AgentProfile>,

    #[serde(default)]
    pub tasks: Vec<TaskNode>,
}

impl CrewFile {
    /// Parse a crew from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a crew file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml(&text)
    }

    /// Validate into a definition.
    pub fn into_definition(self) -> Result<PipelineDefinition, PipelineError> {
        PipelineBuilder::new()
            .agents(self.agents)
            .nodes(self.tasks)
            .build()
    }
}

/// Load a crew file straight into a definition.
pub async fn load_definition(path: impl AsRef<Path>) -> Result<PipelineDefinition, CrewError> {
    Ok(CrewFile::load(path).await?.into_definition()?)
}
