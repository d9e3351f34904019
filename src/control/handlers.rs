use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::logger::{DetailLevel, LevelHandle};

/// Body of every rejected level change.
pub const USAGE: &str = r#"expect JSON body like: {"level":"none|minimal|normal|verbose|debug"}"#;

const JSON: &str = "application/json";

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelStatus {
    pub level: DetailLevel,
}

/// Payload of `PUT /set`. A missing `level` means the current level. The
/// name must match a canonical level name exactly.
#[derive(Debug, Deserialize)]
struct LevelChange {
    level: Option<String>,
}

pub async fn get_level(State(level): State<LevelHandle>) -> Json<LevelStatus> {
    Json(LevelStatus { level: level.get() })
}

pub async fn set_level(
    State(handle): State<LevelHandle>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !has_content_type(&headers, JSON) {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            [(header::ACCEPT, HeaderValue::from_static(JSON))],
            "Unsupported Media Type",
        )
            .into_response();
    }

    // `null` decodes to no change, like `{}`.
    let change: Option<LevelChange> = match serde_json::from_slice(&body) {
        Ok(change) => change,
        Err(_) => return (StatusCode::UNPROCESSABLE_ENTITY, USAGE).into_response(),
    };

    let requested = match change.and_then(|change| change.level) {
        None => handle.get(),
        Some(name) => match DetailLevel::from_canonical(&name) {
            Some(level) => level,
            None => return (StatusCode::UNPROCESSABLE_ENTITY, USAGE).into_response(),
        },
    };

    let previous = handle.replace(requested);
    if previous == requested {
        return StatusCode::ALREADY_REPORTED.into_response();
    }

    tracing::info!(from = %previous, to = %requested, "Detail level changed");
    StatusCode::ACCEPTED.into_response()
}

pub fn method_not_allowed(allowed: Method) -> Response {
    let allow = HeaderValue::from_str(allowed.as_str())
        .unwrap_or_else(|_| HeaderValue::from_static("GET"));
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        "Method Not Allowed",
    )
        .into_response()
}

/// Whether the declared content type is `mime`. Parameters are ignored and a
/// comma-separated list matches if any entry does; an absent header counts
/// as `application/octet-stream`.
pub fn has_content_type(headers: &HeaderMap, mime: &str) -> bool {
    let declared = match headers.get(header::CONTENT_TYPE) {
        None => return mime.eq_ignore_ascii_case("application/octet-stream"),
        Some(value) => match value.to_str() {
            Ok(value) => value,
            Err(_) => return false,
        },
    };

    declared.split(',').any(|entry| {
        let essence = entry.split(';').next().unwrap_or("").trim();
        !essence.is_empty() && essence.eq_ignore_ascii_case(mime)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_has_content_type() {
        assert!(has_content_type(&content_type("application/json"), JSON));
        assert!(has_content_type(&content_type("application/json; charset=utf-8"), JSON));
        assert!(has_content_type(&content_type("text/plain, application/json"), JSON));
        assert!(!has_content_type(&content_type("text/plain"), JSON));
        assert!(!has_content_type(&HeaderMap::new(), JSON));
        assert!(has_content_type(&HeaderMap::new(), "application/octet-stream"));
    }

    #[test]
    fn test_usage_literal() {
        assert_eq!(
            USAGE,
            "expect JSON body like: {\"level\":\"none|minimal|normal|verbose|debug\"}"
        );
    }
}
