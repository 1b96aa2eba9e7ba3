// ABOUTME: Per-run state - task statuses, captured results and completion order,
// ABOUTME: owned by a single execute call and turned into a RunResult at the end.

use std::collections::HashMap;

use uuid::Uuid;

use super::PipelineDefinition;
use crate::error::SinkError;

/// Lifecycle of a task within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Mutable state of one pipeline execution.
#[derive(Debug)]
pub struct PipelineRun {
    run_id: String,
    status: HashMap<String, NodeStatus>,
    results: HashMap<String, String>,
    order: Vec<String>,
    sink_failures: Vec<SinkError>,
}

impl PipelineRun {
    /// Fresh run with every task pending.
    pub fn new(definition: &PipelineDefinition) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            status: definition
                .nodes()
                .iter()
                .map(|n| (n.id.clone(), NodeStatus::Pending))
                .collect(),
            results: HashMap::new(),
            order: Vec::new(),
            sink_failures: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn status(&self, node_id: &str) -> Option<NodeStatus> {
        self.status.get(node_id).copied()
    }

    /// Result of a completed task.
    pub fn result(&self, node_id: &str) -> Option<&str> {
        self.results.get(node_id).map(String::as_str)
    }

    /// Ids of completed tasks, in completion order.
    pub fn completed(&self) -> &[String] {
        &self.order
    }

    pub fn start(&mut self, node_id: &str) {
        self.status.insert(node_id.to_string(), NodeStatus::Running);
    }

    pub fn complete(&mut self, node_id: &str, result: String) {
        self.status.insert(node_id.to_string(), NodeStatus::Completed);
        self.results.insert(node_id.to_string(), result);
        self.order.push(node_id.to_string());
    }

    pub fn fail(&mut self, node_id: &str) {
        self.status.insert(node_id.to_string(), NodeStatus::Failed);
    }

    pub fn record_sink_failure(&mut self, error: SinkError) {
        self.sink_failures.push(error);
    }

    /// Finish the run; `output` is the final task's result.
    pub fn finish(self, output: String) -> RunResult {
        RunResult {
            run_id: self.run_id,
            output,
            results: self.results,
            order: self.order,
            sink_failures: self.sink_failures,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunResult {
    pub run_id: String,

    /// Result of the last task in execution order.
    pub output: String,

    /// Every task's result, by task id.
    pub results: HashMap<String, String>,

    /// Task ids in the order they completed.
    pub order: Vec<String>,

    /// Output files that could not be written. The run still succeeded.
    pub sink_failures: Vec<SinkError>,
}
