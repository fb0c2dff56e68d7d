use anyhow::{anyhow, Result};

pub const DEFAULT_OPENAI_API_VERSION: &str = "2024-02-15-preview";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub search: SearchConfig,
    pub openai: OpenAiConfig,
}

/// Azure AI Search connection used by the retriever.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    pub index_name: String,
    pub api_key: String,
}

/// Azure OpenAI connection shared by the embedder and the responder.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub embedding_model: String,
    pub chat_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("missing required environment variable {}", key))
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow!("invalid PORT {:?}: {}", raw, e))?,
            None => 8080,
        };

        Ok(Config {
            port,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            search: SearchConfig {
                endpoint: trim_endpoint(required("AZURE_SEARCH_SERVICE_ENDPOINT")?),
                index_name: required("AZURE_SEARCH_INDEX_NAME")?,
                api_key: required("AZURE_SEARCH_API_KEY")?,
            },
            openai: OpenAiConfig {
                endpoint: trim_endpoint(required("AZURE_OPENAI_ENDPOINT")?),
                api_key: required("AZURE_OPENAI_KEY")?,
                api_version: lookup("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_OPENAI_API_VERSION.to_string()),
                embedding_model: required("EMBEDDING_ENGINE")?,
                chat_model: required("GPT_ENGINE")?,
            },
        })
    }
}

fn trim_endpoint(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}
