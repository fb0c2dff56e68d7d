// Embedder Agent: Turns the user question into a query vector

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::Embedder;
use crate::error::ApiError;
use crate::models::EmbeddingVector;
use crate::openai::AzureOpenAiClient;

pub struct AzureEmbedder {
    client: Arc<AzureOpenAiClient>,
    model: String,
}

impl AzureEmbedder {
    pub fn new(client: Arc<AzureOpenAiClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl Embedder for AzureEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ApiError> {
        let vector = self.client.embeddings(&self.model, text).await?;
        info!(dims = vector.len(), "Embedder: query embedded");
        Ok(vector)
    }
}
