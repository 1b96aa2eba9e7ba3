// ABOUTME: TaskNode - one step of a pipeline: prompt templates, the agent that
// ABOUTME: answers it, the upstream nodes it reads, and an optional output file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::template::{self, Inputs};

/// A unit of work assigned to one agent.
///
/// Templates may reference input parameters as `{name}`. A placeholder
/// naming one of the node's dependencies is left in place; upstream output
/// is appended as a context block by the executor instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    pub id: String,

    #[serde(rename = "description")]
    pub description_template: String,

    #[serde(rename = "expected_output", default)]
    pub expected_output_template: String,

    /// Id of the agent that performs this task.
    #[serde(rename = "agent")]
    pub agent_ref: String,

    /// Upstream node ids, in the order their results are appended.
    #[serde(rename = "context", default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// File that receives this node's result.
    #[serde(rename = "output_file", default, skip_serializing_if = "Option::is_none")]
    pub output_sink: Option<PathBuf>,
}

impl TaskNode {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description_template: description.into(),
            expected_output_template: String::new(),
            agent_ref: agent.into(),
            depends_on: Vec::new(),
            output_sink: None,
        }
    }

    /// Describe what a good answer looks like.
    pub fn expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output_template = expected.into();
        self
    }

    /// Set the upstream nodes whose results this node reads.
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Persist the result to `path`.
    pub fn output_sink(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_sink = Some(path.into());
        self
    }

    /// Render the description from `inputs`.
    pub fn render_description(&self, inputs: &Inputs) -> Result<String, TemplateError> {
        template::render_with(&self.description_template, inputs, self.depends_on.as_slice())
    }

    /// Render the expected output from `inputs`.
    pub fn render_expected_output(&self, inputs: &Inputs) -> Result<String, TemplateError> {
        template::render_with(&self.expected_output_template, inputs, self.depends_on.as_slice())
    }
}
