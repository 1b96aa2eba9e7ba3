// ABOUTME: Hook system for observing pipeline runs - run and task lifecycle
// ABOUTME: events, the Hook trait, and a registry that fans events out to hooks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Failed,
    Cancelled,
}

/// Events fired while a pipeline runs.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Fired after pre-flight checks pass, before the first task.
    RunStarted { run_id: String, tasks: usize },

    /// Fired before a task's agent is invoked.
    NodeStarted {
        run_id: String,
        node_id: String,
        agent_id: String,
    },

    /// Fired after a task's result is recorded and persisted.
    NodeCompleted {
        run_id: String,
        node_id: String,
        agent_id: String,
        output: String,
        elapsed: Duration,
    },

    /// Fired when a task's invocation fails.
    NodeFailed {
        run_id: String,
        node_id: String,
        error: String,
    },

    /// Fired once when the run ends, however it ends.
    RunFinished { run_id: String, status: RunStatus },
}

impl PipelineEvent {
    pub fn run_id(&self) -> &str {
        match self {
            PipelineEvent::RunStarted { run_id, .. }
            | PipelineEvent::NodeStarted { run_id, .. }
            | PipelineEvent::NodeCompleted { run_id, .. }
            | PipelineEvent::NodeFailed { run_id, .. }
            | PipelineEvent::RunFinished { run_id, .. } => run_id,
        }
    }
}

/// Observer of pipeline events.
///
/// Hooks cannot alter a run; an error is logged and the run continues.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn on_event(&self, event: &PipelineEvent) -> Result<(), anyhow::Error>;

    /// Filter which events this hook cares about. Defaults to all.
    fn accepts(&self, event: &PipelineEvent) -> bool {
        let _ = event;
        true
    }
}

/// Registry for managing and firing hooks.
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<Vec<Arc<dyn Hook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook.
    pub async fn register(&self, hook: impl Hook + 'static) {
        self.hooks.write().await.push(Arc::new(hook));
    }

    /// Register a hook wrapped in Arc.
    pub async fn register_arc(&self, hook: Arc<dyn Hook>) {
        self.hooks.write().await.push(hook);
    }

    /// Deliver an event to every interested hook, in registration order.
    pub async fn fire(&self, event: &PipelineEvent) {
        let hooks: Vec<Arc<dyn Hook>> = self.hooks.read().await.clone();
        for hook in hooks.iter().filter(|h| h.accepts(event)) {
            if let Err(e) = hook.on_event(event).await {
                tracing::warn!(run_id = %event.run_id(), error = %e, "hook failed");
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.hooks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.hooks.read().await.is_empty()
    }

    /// Register a callback for completed tasks.
    ///
    /// The callback receives (node_id, output).
    pub async fn on_node_complete<F>(&self, f: F)
    where
        F: Fn(&str, &str) + Send + Sync + 'static,
    {
        self.register(NodeCompleteHook { callback: f }).await;
    }

    /// Register a callback for the end of a run.
    pub async fn on_run_finished<F>(&self, f: F)
    where
        F: Fn(&str, RunStatus) + Send + Sync + 'static,
    {
        self.register(RunFinishedHook { callback: f }).await;
    }
}

/// Hook wrapper for NodeCompleted events.
struct NodeCompleteHook<F> {
    callback: F,
}

#[async_trait]
impl<F> Hook for NodeCompleteHook<F>
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn accepts(&self, event: &PipelineEvent) -> bool {
        matches!(event, PipelineEvent::NodeCompleted { .. })
    }

    async fn on_event(&self, event: &PipelineEvent) -> Result<(), anyhow::Error> {
        if let PipelineEvent::NodeCompleted {
            node_id, output, ..
        } = event
        {
            (self.callback)(node_id, output);
        }
        Ok(())
    }
}

/// Hook wrapper for RunFinished events.
struct RunFinishedHook<F> {
    callback: F,
}

#[async_trait]
impl<F> Hook for RunFinishedHook<F>
where
    F: Fn(&str, RunStatus) + Send + Sync,
{
    fn accepts(&self, event: &PipelineEvent) -> bool {
        matches!(event, PipelineEvent::RunFinished { .. })
    }

    async fn on_event(&self, event: &PipelineEvent) -> Result<(), anyhow::Error> {
        if let PipelineEvent::RunFinished { run_id, status } = event {
            (self.callback)(run_id, *status);
        }
        Ok(())
    }
}
