// ABOUTME: The LlmClient seam - one chat completion per call, so agents can run on
// ABOUTME: OpenAI, Groq, OpenRouter, Ollama or a scripted stand-in in tests.

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::LlmError;

/// A chat-completion backend. Implementations are shared across agents and runs.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `req` and wait for the whole reply.
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}
