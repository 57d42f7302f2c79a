use crate::api::models::AppState;
use crate::api::settings::handlers::{get_settings_handler, update_settings_handler};
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/settings",
        get(get_settings_handler).put(update_settings_handler),
    )
}
