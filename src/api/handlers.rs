use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::search::{BatchSearcher, ResponseEnvelope, SearchRequest};

pub struct AppState {
    pub searcher: Arc<BatchSearcher>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

const EMPTY_QUERY_MSG: &str = "query or ip could not be empty";
const MALFORMED_BODY_MSG: &str = r#"request body must be {"ip": [...]}"#;

/// Search a comma-separated `ip` query parameter
///
/// When `ip` is repeated only the first occurrence is used.
pub async fn search_get(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Json<ResponseEnvelope> {
    let first_ip = query
        .ok()
        .and_then(|Query(pairs)| pairs.into_iter().find(|(key, _)| key == "ip"))
        .map(|(_, value)| value);

    let raw = match first_ip {
        Some(ip) if !ip.is_empty() => ip,
        _ => {
            info!("{}", EMPTY_QUERY_MSG);
            return Json(ResponseEnvelope::bad_request(EMPTY_QUERY_MSG));
        }
    };

    let ips = raw.split(',').map(str::to_string).collect();
    Json(state.searcher.search(ips).await)
}

/// Search a JSON body of the form `{"ip": ["1.2.3.4", ...]}`
///
/// An empty body or a missing/null `ip` is treated as an empty batch.
pub async fn search_post(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Json<ResponseEnvelope> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Json(state.searcher.search(Vec::new()).await);
    }

    let request = match serde_json::from_slice::<SearchRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            info!(error = %e, "{}", MALFORMED_BODY_MSG);
            return Json(ResponseEnvelope::bad_request(MALFORMED_BODY_MSG));
        }
    };

    Json(state.searcher.search(request.into_ips()).await)
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
