// ABOUTME: Agent module - static agent profiles and the invocation boundary.
// ABOUTME: Provides AgentProfile, AgentInvoker, the LLM-backed invoker and its tool cache.

mod cache;
mod invoker;
mod profile;

pub use cache::{DEFAULT_CACHE_CAPACITY, ToolCache};
pub use invoker::{
    AgentInvoker, AgentOutcome, ClientFactory, LlmInvoker, system_prompt, task_prompt,
};
pub use profile::AgentProfile;

#[cfg(test)]
mod invoker_test;
