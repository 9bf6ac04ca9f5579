use crate::server::handlers::{
    analyze_handler, not_found_handler, server_status_handler, upload_form_handler,
    upload_handler,
};
use crate::server::types::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(
    state: Arc<AppState>,
    max_upload_bytes: usize,
    request_timeout: Duration,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let timeout = TimeoutLayer::new(request_timeout);
    let request_body_limit = RequestBodyLimitLayer::new(max_upload_bytes);

    Router::new()
        .route("/", get(server_status_handler))
        .route("/upload", get(upload_form_handler).post(upload_handler))
        .route("/analyze/{file_key}", get(analyze_handler))
        .fallback(not_found_handler)
        // multipart uploads are bounded by the body limit layer instead
        .layer(DefaultBodyLimit::disable())
        .layer(timeout)
        .layer(cors)
        .layer(request_body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
