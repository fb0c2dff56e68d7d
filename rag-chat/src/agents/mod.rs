pub mod embedder;
pub mod retriever;
pub mod responder;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{ChatAnswer, EmbeddingVector, RetrievedDocument};

pub use embedder::AzureEmbedder;
pub use responder::AzureResponder;
pub use retriever::AzureSearchRetriever;

/// Number of neighbours requested from the search index.
pub const TOP_K: usize = 5;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, ApiError>;
}

/// Non-200 replies from the index degrade to an empty list instead of an error.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, vector: &[f32]) -> Result<Vec<RetrievedDocument>, ApiError>;
}

#[async_trait]
pub trait Responder: Send + Sync {
    async fn answer(&self, query: &str, context: &[RetrievedDocument])
        -> Result<ChatAnswer, ApiError>;
}
