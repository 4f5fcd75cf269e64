use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::search::BatchSearcher;

use super::handlers::{health_check, search_get, search_post, AppState};

/// `/search` answers GET and POST; any other method gets 405 from the method router
pub fn create_api_router(searcher: Arc<BatchSearcher>) -> Router {
    let state = Arc::new(AppState { searcher });

    Router::new()
        .route("/health", get(health_check))
        .route("/search", get(search_get).post(search_post))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
