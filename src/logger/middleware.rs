//! The tower adapter: a layer around a request handler. The client side
//! reuses the same service under the names in `transport.rs`.
//!
//! ```rust,ignore
//! let logger = ExchangeLogger::minimal(OutputSink::stdout())?;
//! let app = Router::new()
//!     .route("/widgets/{id}", get(get_widget))
//!     .layer(logger.layer());
//! ```

use axum::body::Body;
use axum::http::{Request, Response};
use axum::BoxError;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use http_body::Body as HttpBody;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::logger::exchange::ExchangeLogger;

/// Layer producing [`RequestLogger`] services.
#[derive(Clone, Debug)]
pub struct RequestLoggerLayer {
    logger: ExchangeLogger,
}

impl RequestLoggerLayer {
    pub fn new(logger: ExchangeLogger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLogger<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogger::new(inner, self.logger.clone())
    }
}

/// Logs every exchange passing through the wrapped service.
#[derive(Clone, Debug)]
pub struct RequestLogger<S> {
    inner: S,
    logger: ExchangeLogger,
}

impl<S> RequestLogger<S> {
    pub fn new(inner: S, logger: ExchangeLogger) -> Self {
        Self { inner, logger }
    }
}

impl<S, ResBody> Service<Request<Body>> for RequestLogger<S>
where
    S: Service<Request<Body>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // Use the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let logger = self.logger.clone();

        Box::pin(async move { logger.exchange(&mut inner, request).await })
    }
}

impl ExchangeLogger {
    /// Layer logging every exchange of the wrapped handler.
    pub fn layer(&self) -> RequestLoggerLayer {
        RequestLoggerLayer::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::level::DetailLevel;
    use crate::observability::sink::{MemorySink, OutputSink};
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    #[tokio::test]
    async fn test_handler_reads_full_body() {
        let mem = MemorySink::new();
        let output = OutputSink::from_writer(mem.clone());
        let logger = ExchangeLogger::new(DetailLevel::Debug, output).unwrap();

        let handler = service_fn(|req: Request<Body>| async move {
            let body = req.into_body().collect().await.unwrap().to_bytes();
            Ok::<_, Infallible>(Response::new(Body::from(body)))
        });

        let response = logger
            .layer()
            .layer(handler)
            .oneshot(Request::post("/echo").body(Body::from("ping")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "ping");

        let out = mem.contents();
        assert!(out.contains("\r\n\r\nping\n----------  END  REQUEST"));
        assert!(out.contains("ping\n==========  END  RESPONSE"));
    }

    #[tokio::test]
    async fn test_inner_error_propagates_without_response_render() {
        let mem = MemorySink::new();
        let logger = ExchangeLogger::minimal(OutputSink::from_writer(mem.clone())).unwrap();

        let failing = service_fn(|_req: Request<Body>| async move {
            Err::<Response<Body>, _>(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
        });

        let err = logger
            .layer()
            .layer(failing)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert!(mem.contents().contains("(request)"));
        assert!(!mem.contents().contains("(response)"));
    }
}
