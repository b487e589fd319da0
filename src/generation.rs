//! A single in-flight generation: the event stream plus its cancel handle.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::accumulator::{GenerationResult, TextAccumulator};
use crate::frame::{Frame, FrameStreamExt, Framing};
use crate::mapper::{Mapped, ResponseMapper};
use crate::transport::{GuardedStream, Transport, TransportRequest};
use crate::types::{ProviderIdentity, StreamEvent};
use crate::Error;

/// Everything a provider decides about one call before any I/O happens.
pub struct StreamPlan {
    pub request: TransportRequest,
    pub framing: Framing,
    pub mapper: Arc<dyn ResponseMapper>,
    pub idle_timeout: Option<Duration>,
}

/// Stream of [`StreamEvent`]s for one generate call.
///
/// Nothing is sent until the stream is first polled. The stream owns the
/// transport and request it was created with, so replacing the active
/// provider never affects a generation already handed out.
pub struct Generation {
    identity: ProviderIdentity,
    cancel: CancellationToken,
    events: BoxStream<'static, StreamEvent>,
}

impl Generation {
    /// Create a generation from an arbitrary event stream.
    pub fn from_stream<S>(identity: ProviderIdentity, cancel: CancellationToken, stream: S) -> Self
    where
        S: Stream<Item = StreamEvent> + Send + 'static,
    {
        Self {
            identity,
            cancel,
            events: stream.boxed(),
        }
    }

    /// A generation that fails without touching the network.
    pub fn failed(identity: ProviderIdentity, error: Error) -> Self {
        tracing::warn!(provider = %identity, %error, "generation failed before sending");
        Self::from_stream(
            identity,
            CancellationToken::new(),
            stream::iter([StreamEvent::Failed(error)]),
        )
    }

    /// Open `plan` through `transport` once polled, then decode and map the body.
    pub fn start(transport: Arc<dyn Transport>, identity: ProviderIdentity, plan: StreamPlan) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let provider = identity.clone();

        let events = stream::once(async move {
            let StreamPlan {
                request,
                framing,
                mapper,
                idle_timeout,
            } = plan;
            tracing::debug!(provider = %provider, url = %request.url, ?framing, "starting generation");

            // The idle timeout also bounds the wait for response headers.
            let open = async {
                match idle_timeout {
                    Some(timeout) => tokio::time::timeout(timeout, transport.open(request))
                        .await
                        .unwrap_or(Err(Error::Timeout(timeout))),
                    None => transport.open(request).await,
                }
            };

            let opened = tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled),
                opened = open => opened,
            };

            match opened {
                Ok(body) => {
                    let frames = GuardedStream::new(body, token.clone(), idle_timeout).frames(framing);
                    EventStream::new(frames, mapper, token).boxed()
                }
                Err(error) => {
                    tracing::warn!(provider = %provider, %error, "could not open stream");
                    stream::iter([StreamEvent::Failed(error)]).boxed()
                }
            }
        })
        .flatten();

        Self::from_stream(identity, cancel, events)
    }

    /// The provider and model serving this generation.
    pub fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    /// Stop the generation. The connection is closed and the stream ends
    /// with `Failed(Cancelled)` unless it already finished. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle that cancels this generation from elsewhere.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Consume the stream, keeping whatever text arrived even on failure.
    pub async fn accumulate(mut self) -> GenerationResult {
        let mut accumulator = TextAccumulator::new();
        while let Some(event) = self.events.next().await {
            if accumulator.process_event(event) {
                break;
            }
        }
        accumulator.finalize()
    }

    /// Get just the text of a completed generation (convenience method).
    pub async fn text(self) -> Result<String, Error> {
        self.accumulate().await.into_result()
    }
}

impl Stream for Generation {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_next_unpin(cx)
    }
}

/// Maps decoded frames to events and enforces the single terminal event.
struct EventStream<S> {
    frames: Option<S>,
    mapper: Arc<dyn ResponseMapper>,
    cancel: CancellationToken,
    pending: VecDeque<StreamEvent>,
    finished: bool,
}

impl<S> EventStream<S> {
    fn new(frames: S, mapper: Arc<dyn ResponseMapper>, cancel: CancellationToken) -> Self {
        Self {
            frames: Some(frames),
            mapper,
            cancel,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Queue the terminal event and release the connection.
    fn finish(&mut self, terminal: StreamEvent) {
        self.finished = true;
        self.frames = None;
        self.pending.push_back(terminal);
    }
}

impl<S> Stream for EventStream<S>
where
    S: Stream<Item = Result<Frame, Error>> + Unpin,
{
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if !self.finished && self.cancel.is_cancelled() {
                self.pending.clear();
                self.finish(StreamEvent::Failed(Error::Cancelled));
            }

            if let Some(event) = self.pending.pop_front() {
                return Poll::Ready(Some(event));
            }

            if self.finished {
                return Poll::Ready(None);
            }

            let Some(frames) = self.frames.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(frames.poll_next_unpin(cx)) {
                Some(Ok(Frame::Record(raw))) => match self.mapper.map(&raw) {
                    Mapped::Delta(delta) => {
                        if !delta.is_empty() {
                            return Poll::Ready(Some(StreamEvent::Delta(delta)));
                        }
                    }
                    Mapped::Done(delta) => {
                        if !delta.is_empty() {
                            self.pending.push_back(StreamEvent::Delta(delta));
                        }
                        self.finish(StreamEvent::Completed);
                    }
                    Mapped::Unrecognized => {
                        tracing::debug!(record = raw.get(), "dropping unrecognized record");
                    }
                },
                Some(Ok(Frame::Done)) => self.finish(StreamEvent::Completed),
                Some(Err(error)) => {
                    if !error.is_cancelled() {
                        tracing::warn!(%error, "generation stream failed");
                    }
                    self.finish(StreamEvent::Failed(error));
                }
                None => {
                    tracing::debug!("body ended without an explicit completion signal");
                    self.finish(StreamEvent::Completed);
                }
            }
        }
    }
}
