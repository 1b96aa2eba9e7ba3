// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use crewline::prelude::*;` to get started quickly.

pub use crate::agent::{AgentInvoker, AgentOutcome, AgentProfile, LlmInvoker, ToolCache};
pub use crate::config::CrewConfig;
pub use crate::error::{
    ConfigError, CrewError, LlmError, PipelineError, SinkError, TemplateError, ToolError,
};
pub use crate::llm::{
    ContentBlock, LlmClient, Message, ModelId, OpenAIClient, Provider, ProviderClients, Request,
    Response, Role, StopReason, ToolDefinition, Usage,
};
pub use crate::pipeline::{
    CrewFile, Executor, Hook, HookRegistry, PipelineBuilder, PipelineDefinition, PipelineEvent,
    RunResult, RunStatus, TaskNode,
};
pub use crate::presets::{PRESETS, Preset};
pub use crate::template::Inputs;
pub use crate::tool::{Registry, Tool, ToolResult};
pub use crate::tools::{
    CompanyInfoTool, DuckDuckGoSearchTool, IncomeStatementsTool, StockPriceTool, register_builtin,
};
