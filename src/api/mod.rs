pub mod models;
pub mod reviews;
pub mod settings;
pub mod transport;

// Re-exports
pub use models::*;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use self::transport::json_response;

/// Assemble the full route table.
///
/// Unmatched paths and recognized paths hit with the wrong method both
/// return the same 404 body, so there is no 405 distinction.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .merge(reviews::routes())
        .merge(settings::routes())
        .fallback(not_found_handler)
        .method_not_allowed_fallback(not_found_handler)
        .with_state(state)
}

// Root page handler (simple, keep here). The page is re-read from disk
// on every request, no caching.
pub async fn index_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let page = std::fs::read(state.static_dir.join("index.html"))
        .map_err(|e| AppError::Internal(format!("Failed to read index page: {}", e)))?;

    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        page,
    )
        .into_response())
}

pub async fn not_found_handler() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            error: "Not found".to_string(),
        },
    )
}
