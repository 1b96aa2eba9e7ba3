// ABOUTME: Pipeline module - task nodes, validated definitions, hooks and the
// ABOUTME: executor that runs a crew's tasks in dependency order.

mod context;
mod definition;
mod executor;
pub mod file;
mod graph;
mod hook;
mod node;
mod run;
pub mod sink;

pub use context::compose;
pub use definition::{PipelineBuilder, PipelineDefinition};
pub use executor::Executor;
pub use file::{CrewFile, load_definition};
pub use hook::{Hook, HookRegistry, PipelineEvent, RunStatus};
pub use node::TaskNode;
pub use run::{NodeStatus, PipelineRun, RunResult};
