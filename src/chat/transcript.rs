use crate::llm::models::LlmMessage;

/// The conversation of one session, in the order it happened.
///
/// Entries are only ever appended, or dropped all at once by [`Transcript::clear`].
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<LlmMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(LlmMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(LlmMessage::assistant(content));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// One `role: content` line per entry.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.messages.iter().map(|m| format!("{}: {}", m.role, m.text()))
    }
}
