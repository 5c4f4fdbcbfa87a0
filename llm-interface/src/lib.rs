pub mod openai;
pub mod response;
pub mod serving;

pub use openai::OpenAiProvider;
pub use response::{extract_reply, status_error};
pub use serving::{is_chat_task, ServingEndpointProvider, SUPPORTED_CHAT_TASKS};

use intel_core::{ChatMessage, CoreError};

/// A chat-completions backend.
pub trait ChatProvider {
    fn name(&self) -> &str;

    /// Sends the conversation and returns the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage], max_tokens: u32)
        -> Result<String, CoreError>;
}
