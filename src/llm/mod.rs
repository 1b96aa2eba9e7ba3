// ABOUTME: LLM module - client abstraction for chat-completion providers.
// ABOUTME: Defines types, the client trait, the OpenAI-compatible client and model routing.

mod client;
mod openai;
mod provider;
mod types;

pub use client::*;
pub use openai::*;
pub use provider::*;
pub use types::*;
