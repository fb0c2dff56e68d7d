//! End-to-end runs of the pipeline against a local stand-in for the Azure
//! OpenAI and Azure AI Search endpoints.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::Filter;

use rag_chat::agents::{AzureEmbedder, AzureSearchRetriever, Embedder, Retriever, TOP_K};
use rag_chat::config::Config;
use rag_chat::error::ApiError;
use rag_chat::metrics::Metrics;
use rag_chat::models::RetrievedDocument;
use rag_chat::openai::AzureOpenAiClient;
use rag_chat::pipeline::RagPipeline;

const OPENAI_KEY: &str = "openai-key";
const SEARCH_KEY: &str = "search-key";
const CHAT_REPLY: &str = "O mercado de treinamento em usinagem CNC movimenta US$ 2 milhões por ano.";
const QUESTION: &str = "What is the market size for CNC machining training?";

// ─── Mock backend ───────────────────────────────────────────────────

struct MockBackend {
    search_status: u16,
    search_hits: Value,
    search_requests: Mutex<Vec<(String, Value)>>,
    chat_requests: Mutex<Vec<Value>>,
}

impl MockBackend {
    fn new(search_status: u16, search_hits: Value) -> Arc<Self> {
        Arc::new(Self {
            search_status,
            search_hits,
            search_requests: Mutex::new(vec![]),
            chat_requests: Mutex::new(vec![]),
        })
    }
}

fn start_mock(backend: Arc<MockBackend>) -> SocketAddr {
    let embeddings = warp::post()
        .and(warp::path!("openai" / "deployments" / String / "embeddings"))
        .and(warp::header::<String>("api-key"))
        .and(warp::body::json())
        .map(move |_deployment: String, key: String, body: Value| {
            if key != OPENAI_KEY {
                return warp::reply::with_status(
                    warp::reply::json(&json!({"error": {"code": "401"}})),
                    StatusCode::UNAUTHORIZED,
                );
            }
            let input = body["input"].as_str().unwrap_or_default();
            warp::reply::with_status(
                warp::reply::json(&json!({
                    "data": [{"index": 0, "embedding": [input.len() as f32, 0.5, -0.25]}]
                })),
                StatusCode::OK,
            )
        });

    let search_backend = backend.clone();
    let search = warp::post()
        .and(warp::path!("indexes" / String / "docs" / "search"))
        .and(warp::header::<String>("api-key"))
        .and(warp::body::json())
        .map(move |_index: String, key: String, body: Value| {
            search_backend
                .search_requests
                .lock()
                .unwrap()
                .push((key, body));
            warp::reply::with_status(
                warp::reply::json(&json!({"value": search_backend.search_hits})),
                StatusCode::from_u16(search_backend.search_status).unwrap(),
            )
        });

    let chat_backend = backend;
    let chat = warp::post()
        .and(warp::path!("openai" / "deployments" / String / "chat" / "completions"))
        .and(warp::body::json())
        .map(move |_deployment: String, body: Value| {
            chat_backend.chat_requests.lock().unwrap().push(body);
            warp::reply::json(&json!({
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": CHAT_REPLY}
                }]
            }))
        });

    let (addr, server) =
        warp::serve(embeddings.or(search).or(chat)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn test_config(addr: SocketAddr, openai_key: &'static str) -> Config {
    let endpoint = format!("http://{}", addr);
    Config::from_lookup(|key| {
        let value = match key {
            "AZURE_SEARCH_SERVICE_ENDPOINT" | "AZURE_OPENAI_ENDPOINT" => endpoint.as_str(),
            "AZURE_SEARCH_INDEX_NAME" => "estudos-de-mercado",
            "AZURE_SEARCH_API_KEY" => SEARCH_KEY,
            "AZURE_OPENAI_KEY" => openai_key,
            "EMBEDDING_ENGINE" => "text-embedding-ada-002",
            "GPT_ENGINE" => "gpt-4o",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

fn market_hit() -> Value {
    json!([{"@search.score": 0.91, "chunk": "Market size is $2M annually."}])
}

fn user_prompt(chat_request: &Value) -> String {
    chat_request["messages"][1]["content"]
        .as_str()
        .unwrap()
        .to_string()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_end_to_end_prompt_carries_query_and_chunk() {
    let backend = MockBackend::new(200, market_hit());
    let addr = start_mock(backend.clone());
    let metrics = Metrics::new().unwrap();
    let pipeline = RagPipeline::from_config(&test_config(addr, OPENAI_KEY), &metrics);

    let answer = pipeline.ask(QUESTION).await.unwrap();
    assert_eq!(answer, CHAT_REPLY);

    let searches = backend.search_requests.lock().unwrap();
    assert_eq!(searches.len(), 1);
    let (key, body) = &searches[0];
    assert_eq!(key, SEARCH_KEY);
    assert_eq!(body["count"], true);
    assert_eq!(body["select"], "chunk");
    assert_eq!(body["vectorQueries"][0]["k"], 5);
    assert_eq!(body["vectorQueries"][0]["fields"], "text_vector");
    assert_eq!(body["vectorQueries"][0]["kind"], "vector");
    assert_eq!(body["vectorQueries"][0]["vector"].as_array().unwrap().len(), 3);

    let chats = backend.chat_requests.lock().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["model"], "gpt-4o");
    assert_eq!(chats[0]["temperature"].as_f64(), Some(0.8));
    assert_eq!(chats[0]["messages"][0]["role"], "system");
    let prompt = user_prompt(&chats[0]);
    assert!(prompt.contains(QUESTION));
    assert!(prompt.contains("Market size is $2M annually."));
}

#[tokio::test]
async fn test_search_failure_still_reaches_responder() {
    let backend = MockBackend::new(500, json!([]));
    let addr = start_mock(backend.clone());
    let metrics = Metrics::new().unwrap();
    let pipeline = RagPipeline::from_config(&test_config(addr, OPENAI_KEY), &metrics);

    let answer = pipeline.ask(QUESTION).await.unwrap();

    assert_eq!(answer, CHAT_REPLY);
    let chats = backend.chat_requests.lock().unwrap();
    assert_eq!(chats.len(), 1);
    assert!(user_prompt(&chats[0]).ends_with("O contexto é: []"));
    assert_eq!(metrics.search_degraded.get(), 1);
    assert_eq!(metrics.query_failures.get(), 0);
}

#[tokio::test]
async fn test_retriever_caps_and_orders_results() {
    let backend = MockBackend::new(
        200,
        json!([
            {"@search.score": 0.40, "chunk": "d"},
            {"@search.score": 0.95, "chunk": "a"},
            {"@search.score": 0.10, "chunk": "g"},
            {"@search.score": 0.80, "chunk": "b"},
            {"@search.score": 0.20, "chunk": "f"},
            {"@search.score": 0.60, "chunk": "c"},
            {"@search.score": 0.30, "chunk": "e"}
        ]),
    );
    let addr = start_mock(backend);
    let config = test_config(addr, OPENAI_KEY);
    let retriever = AzureSearchRetriever::new(
        reqwest::Client::new(),
        &config.search,
        Metrics::new().unwrap().search_degraded,
    );

    let documents = retriever.search(&[0.1, 0.2, 0.3]).await.unwrap();

    assert!(documents.len() <= TOP_K);
    assert!(documents.windows(2).all(|pair| pair[0].score >= pair[1].score));
    let chunks: Vec<_> = documents.iter().map(|d| d.chunk.as_str()).collect();
    assert_eq!(chunks, vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_retriever_degrades_on_non_200() {
    let backend = MockBackend::new(403, json!([]));
    let addr = start_mock(backend);
    let config = test_config(addr, OPENAI_KEY);
    let metrics = Metrics::new().unwrap();
    let retriever =
        AzureSearchRetriever::new(reqwest::Client::new(), &config.search, metrics.search_degraded.clone());

    let documents: Vec<RetrievedDocument> = retriever.search(&[0.1]).await.unwrap();

    assert!(documents.is_empty());
    assert_eq!(metrics.search_degraded.get(), 1);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_retriever_logs_status_on_failure() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let addr = start_mock(MockBackend::new(500, json!([])));
    let config = test_config(addr, OPENAI_KEY);
    let retriever = AzureSearchRetriever::new(
        reqwest::Client::new(),
        &config.search,
        Metrics::new().unwrap().search_degraded,
    );

    let documents = retriever.search(&[0.1]).await.unwrap();
    assert!(documents.is_empty());

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let line = output
        .lines()
        .find(|line| line.contains("Search request failed"))
        .expect("no search failure log line");
    assert!(line.contains("WARN"));
    assert!(line.contains("status=500"));
}

#[tokio::test]
async fn test_null_chunk_hit_still_answers() {
    let backend = MockBackend::new(
        200,
        json!([
            {"@search.score": 0.91, "chunk": "Market size is $2M annually."},
            {"@search.score": 0.50, "chunk": null}
        ]),
    );
    let addr = start_mock(backend.clone());
    let metrics = Metrics::new().unwrap();
    let pipeline = RagPipeline::from_config(&test_config(addr, OPENAI_KEY), &metrics);

    let answer = pipeline.ask(QUESTION).await.unwrap();

    assert_eq!(answer, CHAT_REPLY);
    let chats = backend.chat_requests.lock().unwrap();
    let prompt = user_prompt(&chats[0]);
    assert!(prompt.contains("Market size is $2M annually."));
    assert!(prompt.contains(r#"{"chunk":"","score":0.5}"#));
}

#[tokio::test]
async fn test_embedding_is_deterministic() {
    let addr = start_mock(MockBackend::new(200, json!([])));
    let config = test_config(addr, OPENAI_KEY);
    let client = Arc::new(AzureOpenAiClient::new(reqwest::Client::new(), &config.openai));
    let embedder = AzureEmbedder::new(client, config.openai.embedding_model.clone());

    let first = embedder.embed(QUESTION).await.unwrap();
    let second = embedder.embed(QUESTION).await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_embedding_auth_failure_aborts_before_search() {
    let backend = MockBackend::new(200, market_hit());
    let addr = start_mock(backend.clone());
    let metrics = Metrics::new().unwrap();
    let pipeline = RagPipeline::from_config(&test_config(addr, "wrong-key"), &metrics);

    let err = pipeline.ask(QUESTION).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Upstream {
            service: "embeddings",
            status: 401,
            ..
        }
    ));
    assert!(backend.search_requests.lock().unwrap().is_empty());
    assert!(backend.chat_requests.lock().unwrap().is_empty());
    assert_eq!(metrics.query_failures.get(), 1);
}

#[tokio::test]
async fn test_pipeline_is_idempotent_with_deterministic_backends() {
    let backend = MockBackend::new(200, market_hit());
    let addr = start_mock(backend.clone());
    let metrics = Metrics::new().unwrap();
    let pipeline = RagPipeline::from_config(&test_config(addr, OPENAI_KEY), &metrics);

    let first = pipeline.ask(QUESTION).await.unwrap();
    let second = pipeline.ask(QUESTION).await.unwrap();

    assert_eq!(first, second);
    let chats = backend.chat_requests.lock().unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0], chats[1]);
    assert_eq!(metrics.queries.get(), 2);
}
