// Retriever Agent: Vector search against the Azure AI Search index

use async_trait::async_trait;
use prometheus::IntCounter;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use super::{Retriever, TOP_K};
use crate::config::SearchConfig;
use crate::error::ApiError;
use crate::models::{RetrievedDocument, SearchRequest, SearchResponse, VectorQuery};

pub const SEARCH_API_VERSION: &str = "2023-11-01";
pub const VECTOR_FIELD: &str = "text_vector";
pub const CHUNK_FIELD: &str = "chunk";

pub struct AzureSearchRetriever {
    http: Client,
    url: String,
    api_key: String,
    degraded: IntCounter,
}

impl AzureSearchRetriever {
    pub fn new(http: Client, config: &SearchConfig, degraded: IntCounter) -> Self {
        let url = format!(
            "{}/indexes/{}/docs/search?api-version={}",
            config.endpoint, config.index_name, SEARCH_API_VERSION
        );

        Self {
            http,
            url,
            api_key: config.api_key.clone(),
            degraded,
        }
    }
}

#[async_trait]
impl Retriever for AzureSearchRetriever {
    async fn search(&self, vector: &[f32]) -> Result<Vec<RetrievedDocument>, ApiError> {
        let body = SearchRequest {
            count: true,
            select: CHUNK_FIELD,
            vector_queries: vec![VectorQuery {
                vector,
                k: TOP_K,
                fields: VECTOR_FIELD,
                kind: "vector",
            }],
        };

        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Search request failed, continuing without context");
            self.degraded.inc();
            return Ok(vec![]);
        }

        let parsed: SearchResponse = response.json().await?;
        let documents = rank(parsed.value.into_iter().map(Into::into).collect());
        info!(hits = documents.len(), "Retriever: documents found");

        Ok(documents)
    }
}

/// Orders by descending score (stable, so the service's order breaks ties) and keeps the top `TOP_K`.
pub fn rank(mut documents: Vec<RetrievedDocument>) -> Vec<RetrievedDocument> {
    documents.sort_by(|a, b| b.score.total_cmp(&a.score));
    documents.truncate(TOP_K);
    documents
}
