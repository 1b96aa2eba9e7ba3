// ABOUTME: Pipeline Executor - validates a run up front, then invokes each task's
// ABOUTME: agent in dependency order, forwarding results and persisting outputs.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::hook::{HookRegistry, PipelineEvent, RunStatus};
use super::run::{PipelineRun, RunResult};
use super::{PipelineDefinition, TaskNode, context, sink};
use crate::agent::{AgentInvoker, AgentProfile};
use crate::config::CrewConfig;
use crate::error::{PipelineError, TemplateError};
use crate::template::Inputs;

/// A task with every template rendered, ready to invoke.
struct PreparedNode<'a> {
    node: &'a TaskNode,
    agent: AgentProfile,
    description: String,
    expected_output: String,
}

/// Runs pipeline definitions against an agent invoker.
///
/// The executor holds only shared, read-only collaborators, so one executor
/// can serve concurrent runs.
pub struct Executor {
    invoker: Arc<dyn AgentInvoker>,
    hooks: Arc<HookRegistry>,
    node_timeout: Option<Duration>,
    output_dir: Option<PathBuf>,
}

impl Executor {
    pub fn new(invoker: Arc<dyn AgentInvoker>) -> Self {
        Self {
            invoker,
            hooks: Arc::new(HookRegistry::new()),
            node_timeout: None,
            output_dir: None,
        }
    }

    /// Create an executor with the timeout and output directory from `config`.
    pub fn from_config(invoker: Arc<dyn AgentInvoker>, config: &CrewConfig) -> Self {
        let mut executor = Self::new(invoker);
        executor.node_timeout = config.node_timeout;
        executor.output_dir = config.output_dir.clone();
        executor
    }

    /// Share a hook registry with this executor.
    pub fn hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Fail a task whose invocation takes longer than `timeout`.
    pub fn node_timeout(mut self, timeout: Duration) -> Self {
        self.node_timeout = Some(timeout);
        self
    }

    /// Root directory for relative output files.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// The hook registry events are fired to.
    pub fn hook_registry(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Run `definition` to completion.
    pub async fn execute(
        &self,
        definition: &PipelineDefinition,
        inputs: &Inputs,
    ) -> Result<RunResult, PipelineError> {
        self.execute_with_cancel(definition, inputs, &CancellationToken::new())
            .await
    }

    /// Run `definition`, stopping before the next task once `cancel` fires.
    pub async fn execute_with_cancel(
        &self,
        definition: &PipelineDefinition,
        inputs: &Inputs,
        cancel: &CancellationToken,
    ) -> Result<RunResult, PipelineError> {
        let prepared = self.prepare(definition, inputs).await?;
        let mut run = PipelineRun::new(definition);
        let run_id = run.run_id().to_string();

        tracing::info!(%run_id, tasks = prepared.len(), "run started");
        self.hooks
            .fire(&PipelineEvent::RunStarted {
                run_id: run_id.clone(),
                tasks: prepared.len(),
            })
            .await;

        let mut output = String::new();
        for step in &prepared {
            if cancel.is_cancelled() {
                tracing::info!(%run_id, completed = run.completed().len(), "run cancelled");
                self.finish(&run_id, RunStatus::Cancelled).await;
                return Err(PipelineError::Cancelled {
                    completed: run.completed().to_vec(),
                });
            }

            output = self.run_node(&mut run, step).await?;
        }

        tracing::info!(%run_id, "run finished");
        self.finish(&run_id, RunStatus::Completed).await;
        Ok(run.finish(output))
    }

    /// Render every template and validate every referenced agent before
    /// anything is invoked.
    async fn prepare<'a>(
        &self,
        definition: &'a PipelineDefinition,
        inputs: &Inputs,
    ) -> Result<Vec<PreparedNode<'a>>, PipelineError> {
        let missing = |node: &TaskNode| {
            let node = node.id.clone();
            move |TemplateError::MissingParameter(name)| PipelineError::MissingParameter {
                node,
                name,
            }
        };

        let mut prepared = Vec::with_capacity(definition.len());
        for node in definition.execution_order() {
            let agent = definition
                .agent(&node.agent_ref)
                .ok_or_else(|| PipelineError::UnknownAgent {
                    node: node.id.clone(),
                    agent: node.agent_ref.clone(),
                })?;

            prepared.push(PreparedNode {
                node,
                description: node.render_description(inputs).map_err(missing(node))?,
                expected_output: node.render_expected_output(inputs).map_err(missing(node))?,
                agent: agent.render(inputs).map_err(missing(node))?,
            });
        }

        let mut validated = HashSet::new();
        for step in &prepared {
            if !validated.insert(step.agent.id.as_str()) {
                continue;
            }
            self.invoker
                .validate(&step.agent)
                .await
                .map_err(|source| PipelineError::AgentSetup {
                    agent: step.agent.id.clone(),
                    source,
                })?;
        }

        Ok(prepared)
    }

    async fn run_node(
        &self,
        run: &mut PipelineRun,
        step: &PreparedNode<'_>,
    ) -> Result<String, PipelineError> {
        let node = step.node;
        let run_id = run.run_id().to_string();

        run.start(&node.id);
        self.hooks
            .fire(&PipelineEvent::NodeStarted {
                run_id: run_id.clone(),
                node_id: node.id.clone(),
                agent_id: step.agent.id.clone(),
            })
            .await;

        let prompt = context::compose(
            &step.description,
            node.depends_on
                .iter()
                .map(|dep| (dep.as_str(), run.result(dep).unwrap_or_default())),
        );
        tracing::debug!(%run_id, node = %node.id, agent = %step.agent.id, %prompt, "invoking agent");

        let started = Instant::now();
        let invocation = self
            .invoker
            .invoke(&step.agent, &prompt, &step.expected_output);
        let outcome = match self.node_timeout {
            Some(limit) => match tokio::time::timeout(limit, invocation).await {
                Ok(outcome) => outcome,
                Err(_) => Err(anyhow::anyhow!("timed out after {:?}", limit)),
            },
            None => invocation.await,
        };

        let output = match outcome {
            Ok(output) => output,
            Err(source) => {
                run.fail(&node.id);
                tracing::warn!(%run_id, node = %node.id, error = %source, "task failed");
                self.hooks
                    .fire(&PipelineEvent::NodeFailed {
                        run_id: run_id.clone(),
                        node_id: node.id.clone(),
                        error: format!("{:#}", source),
                    })
                    .await;
                self.finish(&run_id, RunStatus::Failed).await;
                return Err(PipelineError::NodeExecution {
                    node_id: node.id.clone(),
                    source,
                });
            }
        };
        let elapsed = started.elapsed();

        run.complete(&node.id, output.clone());

        if let Some(path) = &node.output_sink {
            let path = sink::resolve(self.output_dir.as_deref(), path);
            match sink::write(&path, &output).await {
                Ok(()) => tracing::debug!(%run_id, node = %node.id, path = %path.display(), "output written"),
                Err(e) => {
                    tracing::warn!(%run_id, node = %node.id, error = %e, "could not write task output");
                    run.record_sink_failure(e);
                }
            }
        }

        tracing::info!(
            %run_id,
            node = %node.id,
            elapsed_ms = elapsed.as_millis() as u64,
            "task completed"
        );
        self.hooks
            .fire(&PipelineEvent::NodeCompleted {
                run_id,
                node_id: node.id.clone(),
                agent_id: step.agent.id.clone(),
                output: output.clone(),
                elapsed,
            })
            .await;

        Ok(output)
    }

    async fn finish(&self, run_id: &str, status: RunStatus) {
        self.hooks
            .fire(&PipelineEvent::RunFinished {
                run_id: run_id.to_string(),
                status,
            })
            .await;
    }
}
