//! Shared exchange logic used by both adapters.
//!
//! # Responsibilities
//! - Decide per exchange whether anything is rendered
//! - Capture and re-buffer bodies so every consumer reads them in full
//! - Render request and response messages and write them to the sink
//!
//! # Design Decisions
//! - The level is read once per exchange so request and response are rendered
//!   at the same level even if it changes mid-flight
//! - Every fault of the logger itself becomes a diagnostic; the exchange
//!   always proceeds
//! - Contexts are built from a redacted copy of the headers; the forwarded
//!   request and returned response keep the originals

use axum::body::Body;
use axum::http::{HeaderName, Request, Response};
use axum::BoxError;
use bytes::Bytes;
use http_body::Body as HttpBody;
use std::sync::Arc;
use tower::Service;

use crate::error::{error_chain, LoggerResult};
use crate::http::request::ReplayBody;
use crate::http::response::BufferedResponse;
use crate::logger::context::{RequestContext, ResponseContext};
use crate::logger::helpers;
use crate::logger::level::{DetailLevel, LevelHandle};
use crate::logger::redact::RedactionPolicy;
use crate::logger::template::TemplateSet;
use crate::observability::sink::{Diagnostics, OutputSink};

/// Request/response logger shared by the server layer, the round-trip
/// transport and the level-control surface.
#[derive(Clone, Debug)]
pub struct ExchangeLogger {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    level: LevelHandle,
    policy: RedactionPolicy,
    templates: TemplateSet,
    output: OutputSink,
    diagnostics: Diagnostics,
}

/// Builder for [`ExchangeLogger`].
#[derive(Debug, Default)]
pub struct ExchangeLoggerBuilder {
    level: DetailLevel,
    level_handle: Option<LevelHandle>,
    output: Option<OutputSink>,
    diagnostics: Option<Diagnostics>,
    redacted_headers: Option<Vec<HeaderName>>,
}

impl ExchangeLoggerBuilder {
    /// Initial detail level. Defaults to `none`.
    pub fn level(mut self, level: DetailLevel) -> Self {
        self.level = level;
        self
    }

    /// Share an existing level handle instead of creating one.
    pub fn level_handle(mut self, handle: LevelHandle) -> Self {
        self.level_handle = Some(handle);
        self
    }

    /// Destination of rendered messages. Defaults to stdout.
    pub fn output(mut self, output: OutputSink) -> Self {
        self.output = Some(output);
        self
    }

    /// Destination of the logger's own errors. Defaults to the output sink
    /// with a fixed prefix.
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Header names masked below `debug`. Defaults to `Authorization` and `Cookie`.
    pub fn redacted_headers<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = HeaderName>,
    {
        self.redacted_headers = Some(names.into_iter().collect());
        self
    }

    /// Compile the templates and build the logger.
    pub fn build(self) -> LoggerResult<ExchangeLogger> {
        let policy = match self.redacted_headers {
            Some(names) => RedactionPolicy::with_headers(names),
            None => RedactionPolicy::default(),
        };
        let templates = TemplateSet::new()?;
        let output = self.output.unwrap_or_default();
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Diagnostics::for_sink(&output));
        let level = match self.level_handle {
            Some(handle) => handle,
            None => LevelHandle::new(self.level),
        };

        Ok(ExchangeLogger {
            inner: Arc::new(Inner {
                level,
                policy,
                templates,
                output,
                diagnostics,
            }),
        })
    }
}

impl ExchangeLogger {
    pub fn builder() -> ExchangeLoggerBuilder {
        ExchangeLoggerBuilder::default()
    }

    /// Logger writing to `output` at `level` with default redaction.
    pub fn new(level: DetailLevel, output: OutputSink) -> LoggerResult<Self> {
        Self::builder().level(level).output(output).build()
    }

    /// Logger at `minimal` detail.
    pub fn minimal(output: OutputSink) -> LoggerResult<Self> {
        Self::new(DetailLevel::Minimal, output)
    }

    pub fn level(&self) -> DetailLevel {
        self.inner.level.get()
    }

    pub fn set_level(&self, level: DetailLevel) {
        self.inner.level.set(level);
    }

    /// Handle onto the live level, shared with this logger.
    pub fn level_handle(&self) -> LevelHandle {
        self.inner.level.clone()
    }

    /// Render and write the request message for `level`. The context's
    /// headers are rendered as given.
    pub fn log_request(&self, level: DetailLevel, request: &RequestContext) {
        let rendered = self.inner.templates.render_request(level, request);
        self.emit(rendered);
    }

    /// Render and write the response message for `level`.
    pub fn log_response(&self, level: DetailLevel, response: &ResponseContext) {
        let rendered = self.inner.templates.render_response(level, response);
        self.emit(rendered);
    }

    fn emit(&self, rendered: LoggerResult<Option<String>>) {
        match rendered {
            Ok(Some(message)) => {
                if let Err(e) = self.inner.output.write_message(message.as_bytes()) {
                    self.inner
                        .diagnostics
                        .report(&format!("Error writing log output: {}", e));
                }
            }
            Ok(None) => {}
            Err(e) => self
                .inner
                .diagnostics
                .report(&format!("Error executing template: {}", error_chain(&e))),
        }
    }

    /// Run one exchange through `inner`: render the request, forward it,
    /// record and return the response, render the response. At `none` the
    /// request and response pass through untouched.
    pub(crate) async fn exchange<S, B>(
        &self,
        inner: &mut S,
        request: Request<Body>,
    ) -> Result<Response<Body>, S::Error>
    where
        S: Service<Request<Body>, Response = Response<B>>,
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let level = self.level();
        if !level.is_enabled() {
            let response = inner.call(request).await?;
            return Ok(response.map(Body::new));
        }

        let (request, id) = self.capture_request(level, request).await;
        let response = inner.call(request).await?;
        Ok(self.capture_response(level, id, response).await)
    }

    /// Drain the request body, render the request, and return the request to
    /// forward (body re-buffered) with its identifier.
    pub(crate) async fn capture_request<B>(
        &self,
        level: DetailLevel,
        request: Request<B>,
    ) -> (Request<Body>, Option<String>)
    where
        B: HttpBody<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = request.into_parts();
        let id = helpers::request_id(&parts.extensions, &parts.headers);

        let captured = ReplayBody::capture(body).await;
        if let Some(e) = captured.error() {
            self.inner
                .diagnostics
                .report(&format!("Error reading request body: {}", e));
        }

        let shown = self.inner.policy.redacted(level, &parts.headers);
        let context = RequestContext::new(&parts, &shown, captured.bytes(), id.clone());
        self.log_request(level, &context);

        (Request::from_parts(parts, captured.into_body()), id)
    }

    /// Record the response, rebuild it for the caller, then render it.
    pub(crate) async fn capture_response<B>(
        &self,
        level: DetailLevel,
        id: Option<String>,
        response: Response<B>,
    ) -> Response<Body>
    where
        B: HttpBody<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let recorded = BufferedResponse::capture(response).await;
        if let Some(e) = recorded.body.error() {
            self.inner
                .diagnostics
                .report(&format!("Error reading response body: {}", e));
        }

        let shown = self.inner.policy.redacted(level, &recorded.headers);
        let context = ResponseContext::new(recorded.status, &shown, recorded.body.bytes(), id);
        let response = recorded.into_response();
        self.log_response(level, &context);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::sink::MemorySink;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    fn logger(level: DetailLevel) -> (ExchangeLogger, MemorySink) {
        let mem = MemorySink::new();
        let logger = ExchangeLogger::new(level, OutputSink::from_writer(mem.clone())).unwrap();
        (logger, mem)
    }

    #[tokio::test]
    async fn test_capture_request_keeps_body_for_downstream() {
        let (logger, mem) = logger(DetailLevel::Verbose);
        let request = Request::post("/items")
            .header("host", "api.local")
            .body(Body::from("{\"name\":\"bolt\"}"))
            .unwrap();

        let (forwarded, id) = logger.capture_request(DetailLevel::Verbose, request).await;
        assert!(id.is_none());
        let body = forwarded.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "{\"name\":\"bolt\"}");
        assert!(mem.contents().contains("{\"name\":\"bolt\"}"));
    }

    #[tokio::test]
    async fn test_capture_response_renders_after_rebuild() {
        let (logger, mem) = logger(DetailLevel::Minimal);
        let response = Response::builder()
            .status(StatusCode::ACCEPTED)
            .body(Body::from("queued"))
            .unwrap();

        let out = logger
            .capture_response(DetailLevel::Minimal, Some("r-9".into()), response)
            .await;
        assert_eq!(out.status(), StatusCode::ACCEPTED);
        assert_eq!(mem.contents(), " (response) [r-9] 202 Accepted\n");
    }

    #[test]
    fn test_unregistered_status_renders_empty_text() {
        let (logger, mem) = logger(DetailLevel::Minimal);
        let mut context = ResponseContext::new(StatusCode::OK, &Default::default(), b"", None);
        context.status = 599;
        logger.log_response(DetailLevel::Minimal, &context);
        assert_eq!(mem.contents(), " (response) 599 \n");
    }

    struct BrokenPipe;

    impl std::io::Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_goes_to_diagnostics() {
        let diag = MemorySink::new();
        let logger = ExchangeLogger::builder()
            .level(DetailLevel::Minimal)
            .output(OutputSink::from_writer(BrokenPipe))
            .diagnostics(Diagnostics::for_sink(&OutputSink::from_writer(diag.clone())))
            .build()
            .unwrap();

        let context = ResponseContext::new(StatusCode::OK, &Default::default(), b"", None);
        logger.log_response(DetailLevel::Minimal, &context);
        assert_eq!(
            diag.contents(),
            " [request/response logger] Error writing log output: closed\n"
        );
    }

    #[test]
    fn test_none_writes_nothing() {
        let (logger, mem) = logger(DetailLevel::None);
        let context = ResponseContext::new(StatusCode::OK, &Default::default(), b"", None);
        logger.log_response(DetailLevel::None, &context);
        assert!(mem.is_empty());
    }

    #[test]
    fn test_shared_level_handle() {
        let handle = LevelHandle::new(DetailLevel::Normal);
        let logger = ExchangeLogger::builder()
            .level_handle(handle.clone())
            .output(OutputSink::from_writer(MemorySink::new()))
            .build()
            .unwrap();
        handle.set(DetailLevel::Debug);
        assert_eq!(logger.level(), DetailLevel::Debug);
    }
}
