//! Buffered response capture.
//!
//! # Responsibilities
//! - Record status, headers and body produced by the wrapped stage
//! - Flush the recording to the real destination unchanged
//!
//! # Design Decisions
//! - Version and extensions travel with the recording so the flushed
//!   response is indistinguishable from the original

use axum::body::Body;
use axum::http::{Extensions, HeaderMap, Response, StatusCode, Version};
use axum::BoxError;
use bytes::Bytes;
use http_body::Body as HttpBody;

use crate::http::request::ReplayBody;

/// A response recorded in memory.
#[derive(Debug)]
pub struct BufferedResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub extensions: Extensions,
    pub body: ReplayBody,
}

impl BufferedResponse {
    /// Record `response`, draining its body.
    pub async fn capture<B>(response: Response<B>) -> Self
    where
        B: HttpBody<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            extensions: parts.extensions,
            body: ReplayBody::capture(body).await,
        }
    }

    /// Flush the recording: status, headers and body bytes verbatim.
    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(self.body.into_body());
        *response.status_mut() = self.status;
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers;
        *response.extensions_mut() = self.extensions;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_flush_is_verbatim() {
        let original = Response::builder()
            .status(StatusCode::CREATED)
            .header("x-one", "1")
            .header("x-one", "2")
            .body(Body::from("{\"id\":7}"))
            .unwrap();

        let recorded = BufferedResponse::capture(original).await;
        assert_eq!(recorded.status, StatusCode::CREATED);
        assert_eq!(recorded.body.bytes(), "{\"id\":7}");

        let flushed = recorded.into_response();
        assert_eq!(flushed.status(), StatusCode::CREATED);
        assert_eq!(flushed.headers().get_all("x-one").iter().count(), 2);
        let body = flushed.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "{\"id\":7}");
    }
}
