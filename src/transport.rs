//! HTTP transport: opens a request and exposes the body as a byte stream.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use tokio::time::{Instant, Sleep};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::Error;

/// Incremental response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// A request ready to be handed to a [`Transport`].
#[derive(Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TransportRequest {
    /// Create a POST request with a JSON body.
    pub fn post_json<T: Serialize>(url: impl Into<String>, body: &T) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            method: Method::POST,
            url: url.into(),
            headers,
            body: serde_json::to_value(body)?,
        })
    }

    /// Attach an `Authorization: Bearer` header.
    pub fn bearer(mut self, token: &str) -> Result<Self, Error> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::config("Credential contains characters not allowed in a header"))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }
}

// Header values are left out so credentials never reach the logs.
impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Performs HTTP requests for providers.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send the request and return the response body as it arrives.
    /// Non-2xx responses resolve to [`Error::Http`].
    async fn open(&self, request: TransportRequest) -> Result<ByteStream, Error>;
}

/// [`Transport`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport. Only connecting is bounded by a timeout; streams are
    /// bounded by the idle timeout instead.
    pub fn new(connect_timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: TransportRequest) -> Result<ByteStream, Error> {
        tracing::debug!(method = %request.method, url = %request.url, "opening stream");

        let response = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .json(&request.body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), url = %request.url, "request rejected");
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Box::pin(
            response.bytes_stream().map(|chunk| chunk.map_err(Error::from)),
        ))
    }
}

/// Read a whole body into memory, for the one-shot endpoints.
pub async fn collect_body(mut body: ByteStream) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    while let Some(chunk) = body.next().await {
        data.extend_from_slice(&chunk?);
    }
    Ok(data)
}

struct IdleTimer {
    timeout: Duration,
    sleep: Pin<Box<Sleep>>,
}

impl IdleTimer {
    fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            sleep: Box::pin(tokio::time::sleep(timeout)),
        }
    }

    fn reset(&mut self) {
        self.sleep.as_mut().reset(Instant::now() + self.timeout);
    }
}

/// Wraps a body with cancellation and an idle timeout.
///
/// Cancelling the token, hitting the timeout or reaching an error drops the
/// underlying body, which closes the connection. Each of those ends the
/// stream with a single error item.
pub struct GuardedStream {
    inner: Option<ByteStream>,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    idle: Option<IdleTimer>,
}

impl GuardedStream {
    /// Must be called from within a tokio runtime when `idle_timeout` is set.
    pub fn new(inner: ByteStream, cancel: CancellationToken, idle_timeout: Option<Duration>) -> Self {
        Self {
            inner: Some(inner),
            cancelled: Box::pin(cancel.cancelled_owned()),
            idle: idle_timeout.map(IdleTimer::new),
        }
    }
}

impl Stream for GuardedStream {
    type Item = Result<Bytes, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.inner.is_none() {
            return Poll::Ready(None);
        }

        if this.cancelled.as_mut().poll(cx).is_ready() {
            this.inner = None;
            return Poll::Ready(Some(Err(Error::Cancelled)));
        }

        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if let Some(idle) = this.idle.as_mut() {
                    idle.reset();
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(error))) => {
                this.inner = None;
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(None) => {
                this.inner = None;
                Poll::Ready(None)
            }
            Poll::Pending => {
                if let Some(idle) = this.idle.as_mut() {
                    if idle.sleep.as_mut().poll(cx).is_ready() {
                        let timeout = idle.timeout;
                        this.inner = None;
                        return Poll::Ready(Some(Err(Error::Timeout(timeout))));
                    }
                }
                Poll::Pending
            }
        }
    }
}
