//! Client-side adapter: wraps an outbound transport (any tower service that
//! performs one round trip, e.g. a `hyper_util` client).
//!
//! On transport failure the error is returned unchanged and no response is
//! rendered.

use crate::logger::exchange::ExchangeLogger;
use crate::logger::middleware::{RequestLogger, RequestLoggerLayer};

/// Logs each round trip of the wrapped transport.
pub type RoundTripLogger<S> = RequestLogger<S>;

/// Layer producing [`RoundTripLogger`] services.
pub type RoundTripLayer = RequestLoggerLayer;

impl ExchangeLogger {
    /// Wrap an outbound transport.
    pub fn transport<S>(&self, inner: S) -> RoundTripLogger<S> {
        RoundTripLogger::new(inner, self.clone())
    }

    /// Layer form of [`ExchangeLogger::transport`] for `tower::ServiceBuilder`.
    pub fn transport_layer(&self) -> RoundTripLayer {
        RoundTripLayer::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestIdExt;
    use crate::logger::level::DetailLevel;
    use crate::observability::sink::{MemorySink, OutputSink};
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use http_body_util::BodyExt;
    use tower::{service_fn, ServiceBuilder, ServiceExt};

    #[tokio::test]
    async fn test_caller_gets_unconsumed_body() {
        let mem = MemorySink::new();
        let output = OutputSink::from_writer(mem.clone());
        let logger = ExchangeLogger::new(DetailLevel::Debug, output).unwrap();

        let upstream = service_fn(|_req: Request<Body>| async move {
            Ok::<_, std::io::Error>(
                Response::builder()
                    .status(StatusCode::OK)
                    .header("content-type", "application/json")
                    .body(Body::from("{\"id\":7}"))
                    .unwrap(),
            )
        });

        let client = ServiceBuilder::new()
            .layer(logger.transport_layer())
            .service(upstream);

        let request = Request::get("http://inventory.local/widgets/7")
            .body(Body::empty())
            .unwrap()
            .with_request_id("rt-1");
        let response = client.oneshot(request).await.unwrap();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "{\"id\":7}");

        let out = mem.contents();
        assert!(out.starts_with("  (request) [rt-1] inventory.local GET /widgets/7\n"));
        assert!(out.contains(" (response) [rt-1] 200 OK\n"));
        assert!(out.contains("{\"id\":7}\n==========  END  RESPONSE"));
    }

    #[tokio::test]
    async fn test_transport_error_is_untouched() {
        let mem = MemorySink::new();
        let logger = ExchangeLogger::minimal(OutputSink::from_writer(mem.clone())).unwrap();

        let upstream = service_fn(|_req: Request<Body>| async move {
            Err::<Response<Body>, _>(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        });

        let err = logger
            .transport(upstream)
            .oneshot(Request::get("http://down.local/").body(Body::empty()).unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionRefused);
        assert_eq!(mem.contents(), "  (request) down.local GET /\n");
    }
}
