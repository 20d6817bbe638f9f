//! Seam to the hosted language model.

use anyhow::Result;
use async_trait::async_trait;

/// Text-completion client supplied by the embedding application.
///
/// The runtime asks a model for exactly one thing: turn a prompt into text.
/// Tool selection, credential gating, and result shaping all happen on this
/// side of the trait, so a provider swap never touches them.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
