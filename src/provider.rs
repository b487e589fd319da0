use crate::generation::Generation;
use crate::types::ProviderIdentity;

/// A backend that streams text generations.
///
/// `generate` never blocks and never fails directly: problems surface as the
/// terminal event of the returned [`Generation`].
pub trait LLMProvider: Send + Sync + 'static {
    /// The backend and model this provider talks to.
    fn describe(&self) -> ProviderIdentity;

    /// Start a generation for `prompt`.
    fn generate(&self, prompt: &str) -> Generation;
}
