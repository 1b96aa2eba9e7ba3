// ABOUTME: Root module for crewline - sequential multi-agent task pipelines.
// ABOUTME: Re-exports the main public types from submodules.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prelude;
pub mod presets;
pub mod template;
pub mod tool;
pub mod tools;

pub use error::CrewError;
