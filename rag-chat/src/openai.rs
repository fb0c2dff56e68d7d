use reqwest::Client;
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::error::ApiError;
use crate::models::{
    ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, EmbeddingVector,
};

/// Thin client for the Azure OpenAI deployment endpoints.
///
/// Built once at startup and shared by the embedder and the responder.
#[derive(Clone)]
pub struct AzureOpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl AzureOpenAiClient {
    pub fn new(http: Client, config: &OpenAiConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        }
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.endpoint, deployment, operation, self.api_version
        )
    }

    pub async fn embeddings(&self, deployment: &str, input: &str) -> Result<EmbeddingVector, ApiError> {
        let url = self.deployment_url(deployment, "embeddings");
        debug!("Requesting embedding from {}", url);

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&EmbeddingRequest {
                input,
                model: deployment,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream {
                service: "embeddings",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or(ApiError::EmptyResponse("embeddings"))
    }

    pub async fn chat_completion(
        &self,
        deployment: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ApiError> {
        let url = self.deployment_url(deployment, "chat/completions");
        debug!("Requesting chat completion from {}", url);

        let response = self
            .http
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&ChatRequest {
                model: deployment,
                messages,
                temperature,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream {
                service: "chat completion",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ApiError::EmptyResponse("chat completion"))
    }
}
