pub mod health;
pub mod pages;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers::handle_advice;
use crate::listings::handlers::handle_search_listings;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Server-rendered form
        .route(
            "/",
            get(pages::job_search_form).post(pages::job_search_submit),
        )
        // JSON API
        .route("/api/v1/advice", post(handle_advice))
        .route("/api/v1/listings", post(handle_search_listings))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
