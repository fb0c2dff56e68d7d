use thiserror::Error;
use warp::{reject::Reject, Reply, Rejection};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned no usable content")]
    EmptyResponse(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl Reject for ApiError {}

impl ApiError {
    pub fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;

        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::HttpError(_) | ApiError::Upstream { .. } | ApiError::EmptyResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(api_err) = err.find::<ApiError>() {
        let message = match api_err {
            ApiError::BadRequest(_) => "Bad request",
            ApiError::SerializationError(_) => "Internal server error",
            _ => "Upstream service failure",
        };

        let json = warp::reply::json(&serde_json::json!({
            "error": message,
            "details": api_err.to_string(),
        }));

        Ok(warp::reply::with_status(json, api_err.status_code()))
    } else {
        Err(err)
    }
}
