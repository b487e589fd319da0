//! The active-provider slot shared by the generation UI and the settings UI.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::factory::ProviderFactory;
use crate::generation::Generation;
use crate::provider::LLMProvider;
use crate::types::{ModelChoice, ProviderIdentity};
use crate::Error;

/// Holds the currently selected provider.
///
/// Calls capture the provider when they start, so a swap only affects
/// generations started after it.
pub struct ProviderRegistry {
    active: RwLock<Arc<dyn LLMProvider>>,
}

impl ProviderRegistry {
    pub fn new(initial: Arc<dyn LLMProvider>) -> Self {
        Self {
            active: RwLock::new(initial),
        }
    }

    /// Start with the factory's configured provider.
    pub fn from_factory(factory: &ProviderFactory) -> Self {
        Self::new(factory.default_provider())
    }

    /// The provider new calls will use.
    pub fn active(&self) -> Arc<dyn LLMProvider> {
        self.active.read().clone()
    }

    pub fn describe(&self) -> ProviderIdentity {
        self.active().describe()
    }

    /// Replace the active provider, returning the previous one.
    pub fn swap(&self, provider: Arc<dyn LLMProvider>) -> Arc<dyn LLMProvider> {
        let mut active = self.active.write();
        tracing::debug!(from = %active.describe(), to = %provider.describe(), "switching provider");
        std::mem::replace(&mut *active, provider)
    }

    /// Switch to the provider for `choice`.
    pub fn select(&self, factory: &ProviderFactory, choice: ModelChoice) -> ProviderIdentity {
        let provider = factory.create(choice);
        let identity = provider.describe();
        self.swap(provider);
        identity
    }

    /// Generate with the active provider. Blank prompts are rejected without
    /// contacting any backend.
    pub fn generate(&self, prompt: &str) -> Generation {
        let provider = self.active();
        if prompt.trim().is_empty() {
            return Generation::failed(provider.describe(), Error::EmptyPrompt);
        }
        provider.generate(prompt)
    }
}
