use tracing::info;
use warp::Filter;

use rag_chat::config::Config;
use rag_chat::error::handle_rejection;
use rag_chat::metrics::Metrics;
use rag_chat::pipeline::RagPipeline;
use rag_chat::api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting market study RAG chat");
    info!(
        index = %config.search.index_name,
        embedding_model = %config.openai.embedding_model,
        chat_model = %config.openai.chat_model,
        "Configuration loaded"
    );

    let metrics = Metrics::new()?;
    let pipeline = RagPipeline::from_config(&config, &metrics);

    let routes = api::routes(pipeline)
        .recover(handle_rejection)
        .with(warp::log("api"));

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
