use crate::CourseAssistant;
use course_store::CourseTable;
use intel_core::{ChatMessage, University};
use llm_interface::ChatProvider;

/// One conversation about one university's courses.
#[derive(Debug, Clone)]
pub struct ChatSession {
    university: University,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(university: University) -> Self {
        Self {
            university,
            history: Vec::new(),
        }
    }

    pub fn university(&self) -> &University {
        &self.university
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Records `input`, asks the assistant and records the reply.
    /// Blank input is ignored and returns `None`.
    pub async fn send<T: CourseTable, P: ChatProvider>(
        &mut self,
        assistant: &CourseAssistant<T, P>,
        input: &str,
    ) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        self.history.push(ChatMessage::user(input));
        let reply = assistant.respond(&self.university, &self.history).await;
        self.history.push(ChatMessage::assistant(reply.clone()));
        Some(reply)
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
