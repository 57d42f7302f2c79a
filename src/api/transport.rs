use axum::body::Bytes;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

/// Decode a request body into a JSON object.
///
/// Empty, malformed, and non-object bodies all decode to an empty map so
/// that endpoint-level validation handles the missing fields uniformly.
pub fn decode_body(body: &Bytes) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Encode a value as a compact JSON response with an explicit charset.
pub fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Response {
    let raw = serde_json::to_vec(payload).unwrap_or_else(|_| b"{}".to_vec());
    (
        status,
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        raw,
    )
        .into_response()
}
