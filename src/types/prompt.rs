use super::message::Message;

/// System preamble for OpenAI chat models.
pub const OPENAI_PREAMBLE: &str = "You are a todo application assistant, you are creating a actionable checklists for the given todo. Those can be funny and even a little bit naughty. Keep them max 5 points.";

/// System preamble for local models, which need the output format spelled out.
pub const OLLAMA_PREAMBLE: &str = "You are a todo application assistant, you are creating a actionable checklists for the given todo. Those can be funny and even a little bit naughty. Keep them max 5 points and 250 words.
Desired format:
<dot_separated_list_of_action_points_without_whitespace_on_beggining_or_end>";

/// One generation call, built immediately before the request is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model_id: String,
    pub prompt: String,
    pub system_preamble: String,
    pub stream: bool,
}

impl GenerationRequest {
    /// Create a streaming request for `prompt` under a provider's preamble.
    pub fn new(
        model_id: impl Into<String>,
        prompt: impl Into<String>,
        system_preamble: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            system_preamble: system_preamble.into(),
            stream: true,
        }
    }

    /// The conversation sent to chat-style endpoints: preamble, then prompt.
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(self.system_preamble.clone()),
            Message::user(self.prompt.clone()),
        ]
    }
}
