use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EmbeddingVector = Vec<f32>;
pub type ChatAnswer = String;

/// One retrieved chunk as it is handed to the responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub chunk: String,
    pub score: f64,
}

// API Request/Response models
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub request_id: Uuid,
    pub answer: ChatAnswer,
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub query: String,
}

// Azure AI Search wire models
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub count: bool,
    pub select: &'a str,
    pub vector_queries: Vec<VectorQuery<'a>>,
}

#[derive(Debug, Serialize)]
pub struct VectorQuery<'a> {
    pub vector: &'a [f32],
    pub k: usize,
    pub fields: &'a str,
    pub kind: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub value: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    /// Null for documents indexed without the field.
    #[serde(default)]
    pub chunk: Option<String>,
    #[serde(rename = "@search.score")]
    pub score: f64,
}

impl From<SearchHit> for RetrievedDocument {
    fn from(hit: SearchHit) -> Self {
        Self {
            chunk: hit.chunk.unwrap_or_default(),
            score: hit.score,
        }
    }
}

// Azure OpenAI wire models
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub input: &'a str,
    pub model: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: EmbeddingVector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}
