use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Backend family a model belongs to. Credentials are keyed by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    OpenAI,
    Ollama,
}

impl ProviderFamily {
    /// Key under which the family's secret lives in the credential store.
    pub fn credential_key(&self) -> Option<&'static str> {
        match self {
            ProviderFamily::OpenAI => Some(crate::providers::openai::CREDENTIAL_KEY),
            ProviderFamily::Ollama => None,
        }
    }

    pub fn requires_credential(&self) -> bool {
        self.credential_key().is_some()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderFamily::OpenAI => "OpenAI",
            ProviderFamily::Ollama => "Ollama",
        }
    }
}

/// Describes one selectable backend and model pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub display_name: String,
    pub model_id: String,
    pub requires_credential: bool,
}

impl ProviderIdentity {
    pub fn new(family: ProviderFamily, model_id: impl Into<String>) -> Self {
        Self {
            display_name: family.display_name().to_string(),
            model_id: model_id.into(),
            requires_credential: family.requires_credential(),
        }
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.model_id)
    }
}

/// The models offered by the selection surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelChoice {
    Gpt4,
    Gpt35Turbo,
    #[default]
    Mistral,
    Llama2,
    Llama2Uncensored,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 5] = [
        ModelChoice::Gpt4,
        ModelChoice::Gpt35Turbo,
        ModelChoice::Mistral,
        ModelChoice::Llama2,
        ModelChoice::Llama2Uncensored,
    ];

    pub fn model_id(&self) -> &'static str {
        match self {
            ModelChoice::Gpt4 => "gpt-4",
            ModelChoice::Gpt35Turbo => "gpt-3.5-turbo",
            ModelChoice::Mistral => "mistral",
            ModelChoice::Llama2 => "llama2",
            ModelChoice::Llama2Uncensored => "llama2-uncensored",
        }
    }

    pub fn family(&self) -> ProviderFamily {
        match self {
            ModelChoice::Gpt4 | ModelChoice::Gpt35Turbo => ProviderFamily::OpenAI,
            ModelChoice::Mistral | ModelChoice::Llama2 | ModelChoice::Llama2Uncensored => {
                ProviderFamily::Ollama
            }
        }
    }

    pub fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::new(self.family(), self.model_id())
    }
}

impl FromStr for ModelChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ModelChoice::ALL
            .into_iter()
            .find(|choice| choice.model_id() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = ModelChoice::ALL.iter().map(|c| c.model_id()).collect();
                Error::config(format!(
                    "Unknown model '{s}'. Valid values are: {}",
                    valid.join(", ")
                ))
            })
    }
}
