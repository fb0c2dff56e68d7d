use anyhow::Result;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub queries: IntCounter,
    pub query_failures: IntCounter,
    pub search_degraded: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let queries = IntCounter::new("rag_queries_total", "Questions submitted to the pipeline")?;
        let query_failures = IntCounter::new(
            "rag_query_failures_total",
            "Questions aborted by an embedding or chat failure",
        )?;
        let search_degraded = IntCounter::new(
            "rag_search_degraded_total",
            "Searches answered with an empty context after a non-200 reply",
        )?;

        registry.register(Box::new(queries.clone()))?;
        registry.register(Box::new(query_failures.clone()))?;
        registry.register(Box::new(search_degraded.clone()))?;

        Ok(Self {
            registry,
            queries,
            query_failures,
            search_degraded,
        })
    }

    pub fn render(&self) -> Result<(Vec<u8>, String)> {
        let encoder = TextEncoder::new();
        let mut buffer = vec![];
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((buffer, encoder.format_type().to_string()))
    }
}
