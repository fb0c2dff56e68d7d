use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use warp::{Rejection, Reply};

use crate::models::{QueryRequest, QueryResponse};
use crate::pipeline::RagPipeline;

pub async fn handle_query(
    request: QueryRequest,
    pipeline: RagPipeline,
) -> Result<impl Reply, Rejection> {
    let request_id = Uuid::new_v4();
    let span = info_span!("query", %request_id);

    async move {
        info!("Processing query: {}", request.query);

        let answer = pipeline.ask(&request.query).await.map_err(warp::reject::custom)?;

        Ok::<_, Rejection>(warp::reply::json(&QueryResponse { request_id, answer }))
    }
    .instrument(span)
    .await
}
