//! Delta accumulation logic for streaming responses.

use crate::types::{StreamEvent, StreamOutcome};
use crate::Error;

/// Text and terminal outcome of a finished generation.
#[derive(Debug)]
pub struct GenerationResult {
    /// Everything received before the stream ended, even when it failed.
    pub text: String,
    pub outcome: StreamOutcome,
}

impl GenerationResult {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, StreamOutcome::Completed)
    }

    /// The text of a completed generation, or the error that ended it.
    pub fn into_result(self) -> Result<String, Error> {
        match self.outcome {
            StreamOutcome::Completed => Ok(self.text),
            StreamOutcome::Failed(error) => Err(error),
            StreamOutcome::Continuing => Err(Error::stream("stream ended without a terminal event")),
        }
    }
}

/// Accumulates streaming deltas in arrival order.
#[derive(Debug, Default)]
pub struct TextAccumulator {
    text: String,
    deltas: usize,
    outcome: Option<StreamOutcome>,
}

impl TextAccumulator {
    /// Create a new accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns `true` once the terminal event has been seen;
    /// anything after it is ignored.
    pub fn process_event(&mut self, event: StreamEvent) -> bool {
        if self.outcome.is_some() {
            return true;
        }

        match event {
            StreamEvent::Delta(delta) => {
                self.text.push_str(&delta.text);
                self.deltas += 1;
                false
            }
            terminal => {
                self.outcome = Some(terminal.outcome());
                true
            }
        }
    }

    /// Get the current accumulated content.
    pub fn current_text(&self) -> &str {
        &self.text
    }

    pub fn delta_count(&self) -> usize {
        self.deltas
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Finalize into a result. A stream that stopped without a terminal
    /// event is reported as failed; the partial text is kept either way.
    pub fn finalize(self) -> GenerationResult {
        let outcome = self.outcome.unwrap_or_else(|| {
            StreamOutcome::Failed(Error::stream("stream ended without a terminal event"))
        });
        GenerationResult {
            text: self.text,
            outcome,
        }
    }
}
