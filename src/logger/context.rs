//! Rendering contexts handed to the templates.
//!
//! One context type per direction, carrying exactly what the templates read.

use axum::http::{request, HeaderMap, StatusCode, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::logger::helpers::canonical_header_name;

/// Header snapshot keyed by canonical name, sorted for stable output.
pub type HeaderSnapshot = BTreeMap<String, Vec<String>>;

/// Take a rendering snapshot of `headers`. Values that are not valid UTF-8
/// are rendered lossily.
pub fn snapshot_headers(headers: &HeaderMap) -> HeaderSnapshot {
    let mut snapshot = HeaderSnapshot::new();
    for (name, value) in headers {
        snapshot
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    snapshot
}

/// Request side of an exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub host: String,
    pub method: String,
    pub path: String,
    /// Path and query, as sent on the request line.
    pub uri: String,
    pub version: String,
    pub headers: HeaderSnapshot,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Context for `parts`, rendering `headers` in place of the request's own
    /// so callers can pass a redacted copy.
    pub fn new(
        parts: &request::Parts,
        headers: &HeaderMap,
        body: &[u8],
        request_id: Option<String>,
    ) -> Self {
        let host = parts
            .headers
            .get(axum::http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or_default();

        let uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Self {
            host,
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            uri,
            version: version_text(parts.version).to_string(),
            headers: snapshot_headers(headers),
            body: String::from_utf8_lossy(body).into_owned(),
            request_id: request_id.filter(|id| !id.is_empty()),
        }
    }
}

/// Response side of an exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseContext {
    pub status: u16,
    pub headers: HeaderSnapshot,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ResponseContext {
    pub fn new(
        status: StatusCode,
        headers: &HeaderMap,
        body: &[u8],
        request_id: Option<String>,
    ) -> Self {
        Self {
            status: status.as_u16(),
            headers: snapshot_headers(headers),
            body: String::from_utf8_lossy(body).into_owned(),
            request_id: request_id.filter(|id| !id.is_empty()),
        }
    }
}

fn version_text(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}
