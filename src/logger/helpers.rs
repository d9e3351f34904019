//! Helper functions available to every compiled template.
//!
//! Header output is rendered as given: contexts carry headers that the
//! redaction policy has already masked.

use axum::http::{Extensions, HeaderMap, StatusCode};
use std::collections::HashMap;
use std::fmt::Write as _;
use tera::{Tera, Value};

use crate::http::request::{RequestId, X_REQUEST_ID};
use crate::logger::context::{HeaderSnapshot, RequestContext};

/// `x-request-id` → `X-Request-Id`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Canonical reason phrase, empty for unregistered codes.
pub fn status_text(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

pub fn is_error(code: u16) -> bool {
    code >= 400
}

/// Identifier carried by the request, if any. Checked in order: the crate's
/// extension, tower-http's extension, then the `x-request-id` header. Empty
/// identifiers are skipped.
pub fn request_id(extensions: &Extensions, headers: &HeaderMap) -> Option<String> {
    let from_crate = extensions.get::<RequestId>().map(RequestId::as_str);
    let from_tower = extensions
        .get::<tower_http::request_id::RequestId>()
        .and_then(|id| id.header_value().to_str().ok());
    let from_header = headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok());

    [from_crate, from_tower, from_header]
        .into_iter()
        .flatten()
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// One `Name: v1,v2` line per header.
pub fn header_dump(headers: &HeaderSnapshot) -> String {
    let mut out = String::new();
    for (name, values) in headers {
        let _ = writeln!(out, "{}: {}", name, values.join(","));
    }
    out
}

/// Wire-format dump of a request: request line, `Host`, headers, blank line, body.
pub fn request_dump(request: &RequestContext) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} {} {}\r\n", request.method, request.uri, request.version);
    let _ = write!(out, "Host: {}\r\n", request.host);
    for (name, values) in &request.headers {
        if name == "Host" {
            continue;
        }
        for value in values {
            let _ = write!(out, "{}: {}\r\n", name, value);
        }
    }
    out.push_str("\r\n");
    out.push_str(&request.body);
    out
}

fn status_arg(filter: &str, value: &Value) -> tera::Result<u16> {
    value
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .ok_or_else(|| {
            tera::Error::msg(format!("filter `{}` expects a status code, got {}", filter, value))
        })
}

/// Register the helper set on `tera`.
pub fn register_filters(tera: &mut Tera) {
    tera.register_filter("status_text", |value: &Value, _: &HashMap<String, Value>| {
        let code = status_arg("status_text", value)?;
        Ok(Value::String(status_text(code).to_string()))
    });

    tera.register_filter("is_error", |value: &Value, _: &HashMap<String, Value>| {
        let code = status_arg("is_error", value)?;
        Ok(Value::Bool(is_error(code)))
    });

    tera.register_filter("headers", |value: &Value, _: &HashMap<String, Value>| {
        let headers: HeaderSnapshot = serde_json::from_value(value.clone())
            .map_err(|e| tera::Error::msg(format!("filter `headers`: {}", e)))?;
        Ok(Value::String(header_dump(&headers)))
    });

    tera.register_filter("dump", |value: &Value, _: &HashMap<String, Value>| {
        let request: RequestContext = serde_json::from_value(value.clone())
            .map_err(|e| tera::Error::msg(format!("filter `dump`: {}", e)))?;
        Ok(Value::String(request_dump(&request)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tower_http::request_id::RequestId as TowerRequestId;

    fn snapshot(pairs: &[(&str, &[&str])]) -> HeaderSnapshot {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("x-request-id"), "X-Request-Id");
        assert_eq!(canonical_header_name("authorization"), "Authorization");
        assert_eq!(canonical_header_name("CONTENT-TYPE"), "Content-Type");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(200), "OK");
        assert_eq!(status_text(404), "Not Found");
        assert_eq!(status_text(599), "");
        assert!(is_error(400));
        assert!(!is_error(302));
    }

    #[test]
    fn test_header_dump_joins_values() {
        let headers = snapshot(&[
            ("Authorization", &["[redacted]"]),
            ("Accept", &["text/plain", "application/json"]),
        ]);

        let dump = header_dump(&headers);
        assert_eq!(dump, "Accept: text/plain,application/json\nAuthorization: [redacted]\n");
    }

    #[test]
    fn test_request_dump_layout() {
        let request = RequestContext {
            host: "api.local".into(),
            method: "POST".into(),
            path: "/widgets".into(),
            uri: "/widgets?x=1".into(),
            version: "HTTP/1.1".into(),
            headers: snapshot(&[("Host", &["api.local"]), ("X-Trace", &["a", "b"])]),
            body: "{\"id\":7}".into(),
            request_id: None,
        };

        assert_eq!(
            request_dump(&request),
            concat!(
                "POST /widgets?x=1 HTTP/1.1\r\n",
                "Host: api.local\r\n",
                "X-Trace: a\r\nX-Trace: b\r\n",
                "\r\n",
                "{\"id\":7}",
            )
        );
    }

    #[test]
    fn test_request_id_lookup_order() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("from-header"));
        let mut extensions = Extensions::new();
        assert_eq!(request_id(&extensions, &headers).as_deref(), Some("from-header"));

        extensions.insert(TowerRequestId::new(HeaderValue::from_static("from-tower")));
        assert_eq!(request_id(&extensions, &headers).as_deref(), Some("from-tower"));

        extensions.insert(RequestId::new("from-context"));
        assert_eq!(request_id(&extensions, &headers).as_deref(), Some("from-context"));

        assert_eq!(request_id(&Extensions::new(), &HeaderMap::new()), None);
    }

    #[test]
    fn test_empty_request_id_falls_through() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("from-header"));
        let mut extensions = Extensions::new();
        extensions.insert(RequestId::new(""));
        assert_eq!(request_id(&extensions, &headers).as_deref(), Some("from-header"));

        extensions.insert(TowerRequestId::new(HeaderValue::from_static("")));
        assert_eq!(request_id(&extensions, &headers).as_deref(), Some("from-header"));

        let mut empty = HeaderMap::new();
        empty.insert(X_REQUEST_ID, HeaderValue::from_static(""));
        assert_eq!(request_id(&extensions, &empty), None);
    }
}
