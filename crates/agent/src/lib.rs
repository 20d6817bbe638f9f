//! Agent adapter for the retail catalog.
//!
//! This crate is the seam between a conversational model and the catalog
//! service. The model is strictly a translator: it picks a tool and fills in
//! arguments, and everything else is deterministic. The runtime enforces the
//! authorization gate in front of every mutating tool and turns every
//! outcome, including failures, into a tagged JSON result so a well-formed
//! tool call can never surface as a fault.
//!
//! Model invocation itself lives behind the [`llm::LlmClient`] trait and is
//! supplied by the embedding application.

pub mod guardrails;
pub mod llm;
pub mod prompt;
pub mod runtime;
pub mod tools;

pub use llm::LlmClient;
pub use runtime::{AgentRuntime, ToolCall};
pub use tools::{Tool, ToolRegistry};
