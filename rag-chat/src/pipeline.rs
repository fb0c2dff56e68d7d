use std::sync::Arc;

use tracing::{error, info};

use crate::agents::{
    AzureEmbedder, AzureResponder, AzureSearchRetriever, Embedder, Responder, Retriever,
};
use crate::config::Config;
use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::models::ChatAnswer;
use crate::openai::AzureOpenAiClient;

/// embed → search → answer, one step after the other.
#[derive(Clone)]
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    retriever: Arc<dyn Retriever>,
    responder: Arc<dyn Responder>,
    metrics: Metrics,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: Arc<dyn Retriever>,
        responder: Arc<dyn Responder>,
        metrics: Metrics,
    ) -> Self {
        Self {
            embedder,
            retriever,
            responder,
            metrics,
        }
    }

    pub fn from_config(config: &Config, metrics: &Metrics) -> Self {
        let http = reqwest::Client::new();
        let openai = Arc::new(AzureOpenAiClient::new(http.clone(), &config.openai));

        Self::new(
            Arc::new(AzureEmbedder::new(
                openai.clone(),
                config.openai.embedding_model.clone(),
            )),
            Arc::new(AzureSearchRetriever::new(
                http,
                &config.search,
                metrics.search_degraded.clone(),
            )),
            Arc::new(AzureResponder::new(openai, config.openai.chat_model.clone())),
            metrics.clone(),
        )
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn ask(&self, query: &str) -> Result<ChatAnswer, ApiError> {
        if query.trim().is_empty() {
            return Err(ApiError::BadRequest("query must not be empty".to_string()));
        }

        self.metrics.queries.inc();
        let result = self.run(query).await;
        if let Err(e) = &result {
            self.metrics.query_failures.inc();
            error!("Pipeline failed: {}", e);
        }
        result
    }

    async fn run(&self, query: &str) -> Result<ChatAnswer, ApiError> {
        let vector = self.embedder.embed(query).await?;
        let context = self.retriever.search(&vector).await?;
        info!(context_len = context.len(), "Context retrieved");
        self.responder.answer(query, &context).await
    }
}
