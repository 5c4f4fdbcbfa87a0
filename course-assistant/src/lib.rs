//! Course question answering: table lookup, context injection and a call to
//! the chat model.

pub mod session;


pub use session::ChatSession;

use course_store::{lookup_context, CourseTable, COURSE_FETCH_ERROR, NO_COURSE_INFO};
use intel_core::{ChatMessage, University};
use llm_interface::ChatProvider;
use tracing::{error, info};

pub const EMPTY_QUERY_REPLY: &str = "Please enter a valid course code.";
pub const CONTEXT_PREAMBLE: &str = "Use the following course information when answering:\n";

pub struct CourseAssistant<T, P> {
    table: T,
    provider: P,
    max_tokens: u32,
}

impl<T: CourseTable, P: ChatProvider> CourseAssistant<T, P> {
    pub fn new(table: T, provider: P, max_tokens: u32) -> Self {
        Self {
            table,
            provider,
            max_tokens,
        }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Answers the last message of `history`, treated as a course code.
    ///
    /// Lookup misses and failures are returned to the user as-is and the
    /// model is not called. Model failures are reported in the reply text.
    pub async fn respond(&self, university: &University, history: &[ChatMessage]) -> String {
        let query = history
            .last()
            .map(|message| message.content.trim())
            .unwrap_or_default();
        if query.is_empty() {
            return EMPTY_QUERY_REPLY.to_string();
        }

        let context = lookup_context(&self.table, university, query).await;
        if context == NO_COURSE_INFO || context == COURSE_FETCH_ERROR {
            return context;
        }

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(format!("{}{}", CONTEXT_PREAMBLE, context)));
        messages.extend_from_slice(history);

        info!(
            "Calling {} with enriched context for {}",
            self.provider.name(),
            university.id
        );
        match self.provider.complete(&messages, self.max_tokens).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error calling model endpoint: {}", e);
                format!("Error communicating with the model: {}", e)
            }
        }
    }
}
