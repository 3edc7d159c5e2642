//! Generative opponent backed by an LLM chat API.

use super::backend::{BackendError, GenerativeClient};
use super::prompt::build_prompt;
use super::request::OpponentRequest;
use crate::llm_client::LlmClient;
use tracing::{debug, instrument};

/// Asks an LLM for one coordinate move per call.
#[derive(Debug, Clone)]
pub struct LlmOpponent {
    client: LlmClient,
}

impl LlmOpponent {
    /// Wraps a configured client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl GenerativeClient for LlmOpponent {
    #[instrument(skip(self, request), fields(style = %request.style(), generation = request.generation()))]
    async fn propose(&self, request: &OpponentRequest) -> Result<String, BackendError> {
        let prompt = build_prompt(request);
        debug!(legal = request.legal_moves().len(), "Prompting model");
        let reply = self.client.complete(&prompt).await?;
        Ok(reply.trim().to_string())
    }
}
