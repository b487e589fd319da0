//! Stream adapter that splits response bytes into complete JSON records.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use memchr::memmem;
use serde_json::value::RawValue;

use crate::Error;

/// Sentinel some vendors send as the last SSE record.
pub const DONE_SENTINEL: &str = "[DONE]";

const MAX_BUFFER: usize = 1_000_000;

/// Wire framing of a streamed response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// One JSON document per `\n`-terminated line.
    NewlineDelimited,
    /// Records introduced by a `data:` prefix and separated by blank lines.
    ServerSentEvents,
}

/// One decoded unit of the stream.
#[derive(Debug)]
pub enum Frame {
    /// A complete, syntactically valid JSON record.
    Record(Box<RawValue>),
    /// The SSE `[DONE]` sentinel.
    Done,
}

impl Frame {
    pub fn as_record(&self) -> Option<&str> {
        match self {
            Frame::Record(raw) => Some(raw.get()),
            Frame::Done => None,
        }
    }
}

/// A stream adapter that decodes [`Frame`]s from a byte stream.
/// Maintains internal state to handle records split across chunks.
pub struct FrameStream<S> {
    /// The underlying byte stream
    inner: S,
    framing: Framing,
    /// Bytes of the record still being received
    buffer: Vec<u8>,
    /// Decoded frames ready to be yielded
    frames: VecDeque<Frame>,
    /// Set when an unterminated record outgrew the buffer; reported after
    /// the frames decoded before it.
    overflowed: bool,
    exhausted: bool,
}

impl<S> FrameStream<S> {
    pub fn new(stream: S, framing: Framing) -> Self {
        Self {
            inner: stream,
            framing,
            buffer: Vec::new(),
            frames: VecDeque::new(),
            overflowed: false,
            exhausted: false,
        }
    }

    /// Decode every complete record in the buffer, keeping the incomplete tail.
    fn parse_buffer(&mut self) {
        let mut start = 0;

        while let Some((end, next)) = self.next_boundary(start) {
            if let Some(frame) = Self::decode_record(self.framing, &self.buffer[start..end]) {
                self.frames.push_back(frame);
            }
            start = next;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
    }

    /// Find where the record starting at `start` ends and where the next one
    /// begins.
    fn next_boundary(&self, start: usize) -> Option<(usize, usize)> {
        let rest = &self.buffer[start..];
        match self.framing {
            Framing::NewlineDelimited => {
                memchr::memchr(b'\n', rest).map(|pos| (start + pos, start + pos + 1))
            }
            Framing::ServerSentEvents => {
                // A record ends at a blank line or where the next line opens
                // with `data:`, whichever comes first.
                let blank = memmem::find(rest, b"\n\n").map(|pos| (pos, pos + 2));
                let marker = memmem::find(rest, b"\ndata:").map(|pos| (pos, pos + 1));
                let (end, next) = match (blank, marker) {
                    (Some(b), Some(m)) => {
                        if b.0 <= m.0 {
                            b
                        } else {
                            m
                        }
                    }
                    (Some(b), None) => b,
                    (None, Some(m)) => m,
                    (None, None) => return None,
                };
                Some((start + end, start + next))
            }
        }
    }

    /// Turn one record's bytes into a frame. Empty and malformed records
    /// yield `None`; malformed ones are reported and never end the stream.
    fn decode_record(framing: Framing, bytes: &[u8]) -> Option<Frame> {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                let error = Error::MalformedFrame(format!("invalid UTF-8: {e}"));
                tracing::warn!(%error, "dropping frame");
                return None;
            }
        };

        let mut text = text.trim();
        if framing == Framing::ServerSentEvents {
            // Comment lines are keep-alives.
            if text.starts_with(':') {
                return None;
            }
            if let Some(data) = text.strip_prefix("data:") {
                text = data.trim();
            }
        }

        if text.is_empty() {
            return None;
        }
        if framing == Framing::ServerSentEvents && text == DONE_SENTINEL {
            return Some(Frame::Done);
        }

        match serde_json::from_str::<Box<RawValue>>(text) {
            Ok(raw) => Some(Frame::Record(raw)),
            Err(e) => {
                let error = Error::MalformedFrame(e.to_string());
                tracing::warn!(%error, len = text.len(), "dropping frame");
                None
            }
        }
    }

    /// Decode whatever is left once the body has ended.
    fn flush(&mut self) {
        let remaining = std::mem::take(&mut self.buffer);
        if let Some(frame) = Self::decode_record(self.framing, &remaining) {
            self.frames.push_back(frame);
        }
    }
}

impl<S> Stream for FrameStream<S>
where
    S: Stream<Item = Result<Bytes, Error>> + Unpin,
{
    type Item = Result<Frame, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // First, yield any already-decoded frames (FIFO order)
            if let Some(frame) = self.frames.pop_front() {
                return Poll::Ready(Some(Ok(frame)));
            }

            if self.overflowed {
                self.overflowed = false;
                return Poll::Ready(Some(Err(Error::stream(
                    "frame buffer exceeded maximum size",
                ))));
            }

            if self.exhausted {
                return Poll::Ready(None);
            }

            match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => {
                    self.buffer.extend_from_slice(&chunk);
                    self.parse_buffer();

                    // Only an unterminated record is left at this point.
                    if self.buffer.len() > MAX_BUFFER {
                        self.buffer.clear();
                        self.overflowed = true;
                        self.exhausted = true;
                    }
                }
                Some(Err(e)) => {
                    self.buffer.clear();
                    self.exhausted = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    // A final record may arrive without its terminator.
                    self.exhausted = true;
                    self.flush();
                }
            }
        }
    }
}

/// Extension trait to add frame decoding to byte streams.
pub trait FrameStreamExt: Stream {
    /// Decode this byte stream as records in the given framing.
    fn frames(self, framing: Framing) -> FrameStream<Self>
    where
        Self: Sized,
    {
        FrameStream::new(self, framing)
    }
}

impl<S: Stream> FrameStreamExt for S {}
