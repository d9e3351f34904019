//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the exchange logger from configuration
//! - Create the Axum router: logged app routes plus the control surface
//! - Wire up middleware (request id, tracing)
//! - Forward to the upstream through the round-trip logger, or echo
//! - Apply hot-reloaded detail levels

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::PathAndQuery, HeaderName, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::path::Path;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{LoggingConfig, ReqlogConfig};
use crate::error::LoggerResult;
use crate::lifecycle::ShutdownSignal;
use crate::logger::{ExchangeLogger, RoundTripLogger};
use crate::observability::sink::OutputSink;

type UpstreamClient = RoundTripLogger<Client<HttpConnector, Body>>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    upstream: Option<Upstream>,
}

#[derive(Clone)]
struct Upstream {
    base: Uri,
    client: UpstreamClient,
}

/// Build the exchange logger described by `config`.
pub fn build_logger(config: &LoggingConfig) -> LoggerResult<ExchangeLogger> {
    let output = match config.output.as_str() {
        "stdout" => OutputSink::stdout(),
        "stderr" => OutputSink::stderr(),
        path => OutputSink::file(Path::new(path))?,
    };

    // Validation has already rejected unparsable names.
    let redacted = config
        .redacted_headers
        .iter()
        .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok());

    ExchangeLogger::builder()
        .level(config.detail_level())
        .output(output)
        .redacted_headers(redacted)
        .build()
}

/// HTTP server with the exchange logger in front of the app routes.
pub struct HttpServer {
    router: Router,
    logger: ExchangeLogger,
}

impl HttpServer {
    pub fn new(config: &ReqlogConfig, logger: ExchangeLogger) -> Self {
        let upstream = config
            .upstream
            .url
            .as_deref()
            .and_then(|url| url.parse::<Uri>().ok())
            .map(|base| {
                let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
                Upstream {
                    base,
                    client: logger.transport(client),
                }
            });

        let router = Self::build_router(config, &logger, AppState { upstream });
        Self { router, logger }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ReqlogConfig, logger: &ExchangeLogger, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", any(app_handler))
            .route("/{*path}", any(app_handler))
            .with_state(state)
            .layer(logger.layer());

        if config.control.enabled {
            router = router.nest(&config.control.base_path, logger.control_router());
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, applying the detail level
    /// of every reloaded config.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ReqlogConfig>,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, level = %self.logger.level(), "HTTP server starting");

        let level = self.logger.level_handle();
        let mut reload_shutdown = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => {
                            let new_level = config.logging.detail_level();
                            let previous = level.replace(new_level);
                            if previous != new_level {
                                tracing::info!(
                                    from = %previous,
                                    to = %new_level,
                                    "Detail level reloaded"
                                );
                            }
                        }
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward to the upstream when configured, otherwise echo the request.
async fn app_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.upstream {
        Some(upstream) => forward(upstream, request).await,
        None => echo(request),
    }
}

async fn forward(upstream: Upstream, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = upstream.base.clone().into_parts();
    uri_parts.path_and_query = Some(
        parts
            .uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/")),
    );
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    parts.headers.remove(header::HOST);

    match upstream.client.oneshot(Request::from_parts(parts, body)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

fn echo(request: Request<Body>) -> Response {
    let content_type = request.headers().get(header::CONTENT_TYPE).cloned();
    let mut response = Response::new(request.into_body());
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}
