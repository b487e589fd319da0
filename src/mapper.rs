//! Normalizes provider-specific JSON records into text deltas.

use serde_json::value::RawValue;

use crate::providers::ollama::types::{ChatResponse, GenerateResponse};
use crate::providers::openai::types::ChatCompletionChunk;
use crate::types::TextDelta;

/// Result of mapping one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapped {
    /// A fragment of generated text; more are expected.
    Delta(TextDelta),
    /// The provider signalled completion. The carried text, possibly empty,
    /// is the last fragment of the response.
    Done(TextDelta),
    /// Not a record this mapper understands. Dropped by the caller.
    Unrecognized,
}

/// Maps records of one provider's wire shape. Implementations are stateless.
pub trait ResponseMapper: Send + Sync + 'static {
    fn map(&self, record: &RawValue) -> Mapped;
}

/// Chat Completions delta chunks: `choices[*].delta.content`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatCompletionMapper;

impl ResponseMapper for ChatCompletionMapper {
    fn map(&self, record: &RawValue) -> Mapped {
        let Ok(chunk) = serde_json::from_str::<ChatCompletionChunk>(record.get()) else {
            return Mapped::Unrecognized;
        };

        // Fan every choice into one fragment, in array order.
        let text: String = chunk
            .choices
            .iter()
            .filter_map(|choice| choice.delta.content.as_deref())
            .collect();
        Mapped::Delta(TextDelta::new(text))
    }
}

/// Ollama `/api/chat` lines: `message.content` plus `done`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatMessageMapper;

impl ResponseMapper for ChatMessageMapper {
    fn map(&self, record: &RawValue) -> Mapped {
        match serde_json::from_str::<ChatResponse>(record.get()) {
            Ok(line) if line.done => Mapped::Done(TextDelta::new(line.message.content)),
            Ok(line) => Mapped::Delta(TextDelta::new(line.message.content)),
            Err(_) => Mapped::Unrecognized,
        }
    }
}

/// Ollama legacy `/api/generate` lines: `response` plus `done`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateMapper;

impl ResponseMapper for GenerateMapper {
    fn map(&self, record: &RawValue) -> Mapped {
        match serde_json::from_str::<GenerateResponse>(record.get()) {
            Ok(line) if line.done => Mapped::Done(TextDelta::new(line.response)),
            Ok(line) => Mapped::Delta(TextDelta::new(line.response)),
            Err(_) => Mapped::Unrecognized,
        }
    }
}
