use crate::api::models::{AppError, AppState};
use crate::api::transport::{decode_body, json_response};
use crate::storage::truthy;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use tracing::info;

pub async fn get_settings_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let data = state
        .store
        .load()
        .map_err(|e| AppError::Internal(format!("Failed to load store: {}", e)))?;

    Ok(json_response(StatusCode::OK, &data.settings))
}

pub async fn update_settings_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = decode_body(&body);

    let Some(value) = payload.get("internal_review_enabled") else {
        return Err(AppError::BadRequest(
            "internal_review_enabled is required".to_string(),
        ));
    };
    let enabled = truthy(value);

    let settings = state
        .store
        .update(|data| {
            data.settings.internal_review_enabled = enabled;
            data.settings.clone()
        })
        .map_err(|e| AppError::Internal(format!("Failed to save store: {}", e)))?;

    info!(internal_review_enabled = enabled, "Settings updated");

    Ok(json_response(StatusCode::OK, &settings))
}
