use crate::api::models::{AppError, AppState, ReviewDraft};
use crate::api::transport::{decode_body, json_response};
use crate::storage::Review;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{SecondsFormat, Utc};
use tracing::info;

pub async fn list_reviews_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let data = state
        .store
        .load()
        .map_err(|e| AppError::Internal(format!("Failed to load store: {}", e)))?;

    Ok(json_response(StatusCode::OK, &data.reviews))
}

pub async fn create_review_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = decode_body(&body);
    let draft = ReviewDraft::from_payload(&payload).map_err(AppError::BadRequest)?;

    info!(author = %draft.author, "Creating review");

    // Id assignment, internal-flag stamping, and the append all happen
    // inside one store critical section.
    let review = state
        .store
        .update(|data| {
            let review = Review {
                id: data.reviews.len() as u64 + 1,
                author: draft.author,
                text: draft.text,
                internal: data.settings.internal_review_enabled,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            };
            data.reviews.push(review.clone());
            review
        })
        .map_err(|e| AppError::Internal(format!("Failed to save store: {}", e)))?;

    info!(id = review.id, internal = review.internal, "Review created");

    Ok(json_response(StatusCode::CREATED, &review))
}
