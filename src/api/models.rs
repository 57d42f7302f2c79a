use crate::api::transport::json_response;
use crate::storage::JsonStore;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
    pub static_dir: PathBuf,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A validated review submission
#[derive(Debug)]
pub struct ReviewDraft {
    pub text: String,
    pub author: String,
}

impl ReviewDraft {
    /// Extract and validate the submission fields from a decoded body.
    ///
    /// `text` must be non-empty after trimming; `author` falls back to
    /// "Anonymous" when absent, empty, or whitespace-only. Non-string
    /// values for either field are treated as absent.
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, String> {
        let text = payload
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim();
        if text.is_empty() {
            return Err("Review text is required".to_string());
        }

        let author = payload
            .get("author")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|author| !author.is_empty())
            .unwrap_or("Anonymous");

        Ok(Self {
            text: text.to_string(),
            author: author.to_string(),
        })
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        json_response(status, &ErrorResponse { error: message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn valid_submission_is_accepted() {
        let draft =
            ReviewDraft::from_payload(&payload(json!({"text": " Great app ", "author": "Alex"})))
                .unwrap();
        assert_eq!(draft.text, "Great app");
        assert_eq!(draft.author, "Alex");
    }

    #[test]
    fn missing_or_blank_text_is_rejected() {
        for body in [json!({}), json!({"text": ""}), json!({"text": "   "}), json!({"text": null})] {
            let err = ReviewDraft::from_payload(&payload(body)).unwrap_err();
            assert_eq!(err, "Review text is required");
        }
    }

    #[test]
    fn non_string_text_is_rejected() {
        let err = ReviewDraft::from_payload(&payload(json!({"text": 42}))).unwrap_err();
        assert_eq!(err, "Review text is required");
    }

    #[test]
    fn author_falls_back_to_anonymous() {
        for body in [
            json!({"text": "ok"}),
            json!({"text": "ok", "author": ""}),
            json!({"text": "ok", "author": "  "}),
            json!({"text": "ok", "author": 7}),
        ] {
            let draft = ReviewDraft::from_payload(&payload(body)).unwrap();
            assert_eq!(draft.author, "Anonymous");
        }
    }
}
