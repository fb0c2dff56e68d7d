use warp::{Filter, Rejection, Reply};

use crate::pipeline::RagPipeline;

mod page;
mod query;

pub fn routes(
    pipeline: RagPipeline,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    let query_route = api
        .and(warp::path("query"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::json())
        .and(with_pipeline(pipeline.clone()))
        .and_then(query::handle_query);

    let page_route = warp::path::end()
        .and(warp::get())
        .map(page::handle_index);

    let ask_route = warp::path::end()
        .and(warp::post())
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::form())
        .and(with_pipeline(pipeline.clone()))
        .and_then(page::handle_ask);

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})));

    let metrics = warp::path("metrics")
        .and(warp::get())
        .and(with_pipeline(pipeline))
        .map(|pipeline: RagPipeline| match pipeline.metrics().render() {
            Ok((buffer, content_type)) => {
                warp::reply::with_header(buffer, "Content-Type", content_type).into_response()
            }
            Err(e) => warp::reply::with_status(
                e.to_string(),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response(),
        });

    query_route
        .or(page_route)
        .or(ask_route)
        .or(health)
        .or(metrics)
}

fn with_pipeline(
    pipeline: RagPipeline,
) -> impl Filter<Extract = (RagPipeline,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || pipeline.clone())
}
