//! Request-side helpers: the request identifier and body capture/replay.
//!
//! # Responsibilities
//! - Carry an opaque request identifier (generation is left to the host app)
//! - Drain a body once and hand out independent, complete copies
//!
//! # Design Decisions
//! - Bodies are fully buffered in memory before replay; there is no
//!   streaming passthrough
//! - A read failure is kept and handed to the downstream consumer, which
//!   sees the same failure it would have seen without the logger

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Request};
use axum::BoxError;
use bytes::{Bytes, BytesMut};
use http_body::{Body as HttpBody, Frame};
use http_body_util::{BodyExt, StreamBody};

/// Header consulted when no identifier is attached to the request extensions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Opaque request identifier, attached as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Request identifier access on `Request`.
pub trait RequestIdExt {
    /// Attach `id` to the request.
    fn with_request_id(self, id: impl Into<String>) -> Self;

    /// The identifier carried by the request, if any.
    fn request_id(&self) -> Option<String>;
}

impl<B> RequestIdExt for Request<B> {
    fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.extensions_mut().insert(RequestId::new(id));
        self
    }

    fn request_id(&self) -> Option<String> {
        crate::logger::helpers::request_id(self.extensions(), self.headers())
    }
}

/// A body drained into memory, replayable any number of times.
#[derive(Debug, Default)]
pub struct ReplayBody {
    data: Bytes,
    trailers: Option<HeaderMap>,
    error: Option<BoxError>,
}

impl ReplayBody {
    /// Drain `body` completely. On a read failure, the bytes read so far are
    /// kept along with the error.
    pub async fn capture<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let mut body = std::pin::pin!(body);
        let mut data = BytesMut::new();
        let mut trailers: Option<HeaderMap> = None;

        while let Some(frame) = body.frame().await {
            match frame {
                Ok(frame) => match frame.into_data() {
                    Ok(chunk) => data.extend_from_slice(&chunk),
                    Err(frame) => {
                        if let Ok(t) = frame.into_trailers() {
                            trailers.get_or_insert_with(HeaderMap::new).extend(t);
                        }
                    }
                },
                Err(e) => {
                    return Self {
                        data: data.freeze(),
                        trailers,
                        error: Some(e.into()),
                    };
                }
            }
        }

        Self {
            data: data.freeze(),
            trailers,
            error: None,
        }
    }

    /// Everything captured.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// The read failure hit while capturing, if any.
    pub fn error(&self) -> Option<&BoxError> {
        self.error.as_ref()
    }

    /// A fresh body with the complete captured content.
    pub fn replay(&self) -> Body {
        Self::build(self.data.clone(), self.trailers.clone(), None)
    }

    /// The body to forward: captured content, trailers, then the capture
    /// failure if there was one.
    pub fn into_body(self) -> Body {
        Self::build(self.data, self.trailers, self.error)
    }

    fn build(data: Bytes, trailers: Option<HeaderMap>, error: Option<BoxError>) -> Body {
        if trailers.is_none() && error.is_none() {
            return Body::from(data);
        }

        let mut frames: Vec<Result<Frame<Bytes>, BoxError>> = Vec::new();
        if !data.is_empty() {
            frames.push(Ok(Frame::data(data)));
        }
        if let Some(trailers) = trailers {
            frames.push(Ok(Frame::trailers(trailers)));
        }
        if let Some(error) = error {
            frames.push(Err(error));
        }
        Body::new(StreamBody::new(futures_util::stream::iter(frames)))
    }
}
