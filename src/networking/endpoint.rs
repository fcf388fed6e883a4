use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use log::debug;

use super::http::{CachePolicy, HttpBody, HttpEncoding, HttpHeaders, HttpMethod};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Declarative description of one API call.
///
/// Only `base_url` and `path` are required; everything else has the default
/// a plain JSON GET needs. Implementations hold no per-call state, so the same
/// endpoint can be dispatched any number of times.
pub trait Endpoint: Send + Sync {
    fn base_url(&self) -> &str;

    /// Relative path appended to the base URL. A leading slash is ignored.
    fn path(&self) -> &str;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn headers(&self) -> Option<HttpHeaders> {
        None
    }

    /// Query parameters for GET/HEAD, payload for every other method.
    fn body(&self) -> Option<HttpBody> {
        None
    }

    fn encoding(&self) -> HttpEncoding {
        HttpEncoding::None
    }

    fn request_timeout(&self) -> Duration {
        DEFAULT_REQUEST_TIMEOUT
    }

    fn cache_policy(&self) -> CachePolicy {
        CachePolicy::Default
    }

    fn follow_redirects(&self) -> bool {
        false
    }

    /// Follow redirects that switch between http and https.
    /// Only consulted when `follow_redirects` is true.
    fn follow_ssl_redirects(&self) -> bool {
        false
    }

    /// When set, the response body is handed to the handler instead of being
    /// buffered as a string.
    fn stream_handler(&self) -> Option<Arc<dyn StreamHandler>> {
        None
    }

    /// Hooks that see this endpoint's request before it is sent and its
    /// response before it is classified.
    fn monitors(&self) -> Option<Vec<Arc<dyn HttpMonitor>>> {
        None
    }
}

/// Intercepts one call on its way out and on its way back.
///
/// A hook may replace what it is given. An `Err` ends the call as a transport
/// failure, classified like any other I/O error.
#[async_trait]
pub trait HttpMonitor: Send + Sync {
    async fn intercept_request(&self, request: reqwest::Request) -> io::Result<reqwest::Request> {
        Ok(request)
    }

    async fn intercept_response(
        &self,
        response: reqwest::Response,
    ) -> io::Result<reqwest::Response> {
        Ok(response)
    }
}

/// Receives a response body as a live byte stream.
#[async_trait]
pub trait StreamHandler: Send + Sync {
    async fn on_stream(
        &self,
        headers: Option<HttpHeaders>,
        stream: ResponseStream,
    ) -> io::Result<()>;
}

type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Owned handle on a response body.
///
/// The underlying connection is released when this value is dropped, which
/// happens when the handler returns, fails, or panics.
pub struct ResponseStream {
    inner: ByteStream,
    bytes_read: usize,
}

impl ResponseStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
            bytes_read: 0,
        }
    }

    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        use futures::TryStreamExt;
        Self::new(response.bytes_stream().map_err(io::Error::other))
    }

    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }
}

impl Stream for ResponseStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.inner.as_mut().poll_next(cx);
        if let Poll::Ready(Some(Ok(chunk))) = &polled {
            self.bytes_read += chunk.len();
        }
        polled
    }
}

impl Drop for ResponseStream {
    fn drop(&mut self) {
        debug!("Response stream released after {} bytes", self.bytes_read);
    }
}

impl fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream")
            .field("bytes_read", &self.bytes_read)
            .finish()
    }
}
