//! Types for streaming responses.

use crate::Error;

/// One incremental fragment of generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDelta {
    pub text: String,
}

impl TextDelta {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Empty fragments are heartbeats and carry no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// State of a generation stream after an event.
#[derive(Debug)]
pub enum StreamOutcome {
    /// More deltas are expected.
    Continuing,
    /// The provider signalled completion.
    Completed,
    /// The stream ended early.
    Failed(Error),
}

/// Events emitted by a generation stream. Every stream ends with exactly one
/// `Completed` or `Failed` event and yields nothing after it.
#[derive(Debug)]
pub enum StreamEvent {
    /// A chunk of content was received.
    Delta(TextDelta),
    /// The stream has finished.
    Completed,
    /// The stream was terminated by an error, a timeout or cancellation.
    Failed(Error),
}

impl StreamEvent {
    pub fn delta(text: impl Into<String>) -> Self {
        StreamEvent::Delta(TextDelta::new(text))
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Delta(_))
    }

    /// Classify this event; the delta payload itself is dropped.
    pub fn outcome(self) -> StreamOutcome {
        match self {
            StreamEvent::Delta(_) => StreamOutcome::Continuing,
            StreamEvent::Completed => StreamOutcome::Completed,
            StreamEvent::Failed(error) => StreamOutcome::Failed(error),
        }
    }
}
