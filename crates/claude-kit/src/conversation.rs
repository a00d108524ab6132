use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::message::Message;

/// The transcript of one logical conversation, owned by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Keep at most `max_messages`, dropping from the front.
    ///
    /// Dropping continues until the first remaining message is a user text message, so the
    /// transcript never opens with an assistant turn or an orphaned tool result. Returns the
    /// number of messages removed.
    pub fn truncate_to(&mut self, max_messages: usize) -> usize {
        let mut start = self.messages.len().saturating_sub(max_messages);
        while start < self.messages.len() && !self.messages[start].is_user_text() {
            start += 1;
        }
        if start > 0 {
            debug!(
                "Dropping {} of {} messages from conversation",
                start,
                self.messages.len()
            );
            self.messages.drain(..start);
        }
        start
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl Extend<Message> for Conversation {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}
