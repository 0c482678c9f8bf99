use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// One turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// Per-conversation message buffers with oldest-first eviction.
///
/// Process-wide cache only: history lives for the server lifetime and is
/// never persisted.
pub struct ConversationHistory {
    max_messages: usize,
    conversations: Mutex<HashMap<String, VecDeque<HistoryMessage>>>,
}

impl ConversationHistory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages: max_messages.max(2),
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, conversation_id: &str) -> Vec<HistoryMessage> {
        self.conversations
            .lock()
            .unwrap()
            .get(conversation_id)
            .map(|buffer| buffer.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Appends a user/assistant exchange, evicting the oldest messages once
    /// the buffer exceeds its bound.
    pub fn record_exchange(&self, conversation_id: &str, query: &str, answer: &str) {
        let mut conversations = self.conversations.lock().unwrap();
        let buffer = conversations
            .entry(conversation_id.to_string())
            .or_default();
        buffer.push_back(message("user", query));
        buffer.push_back(message("assistant", answer));
        while buffer.len() > self.max_messages {
            buffer.pop_front();
        }
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }
}

fn message(role: &str, content: &str) -> HistoryMessage {
    HistoryMessage {
        role: role.to_string(),
        content: content.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_conversation_is_empty() {
        let history = ConversationHistory::new(30);
        assert!(history.get("nope").is_empty());
        assert_eq!(history.conversation_count(), 0);
    }

    #[test]
    fn exchanges_are_recorded_in_order() {
        let history = ConversationHistory::new(30);
        history.record_exchange("c1", "hi", "hello");
        history.record_exchange("c1", "when does it start", "at nine");

        let messages = history.get("c1");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[3].role, "assistant");
        assert_eq!(messages[3].content, "at nine");
    }

    #[test]
    fn oldest_messages_are_evicted_at_the_bound() {
        let history = ConversationHistory::new(4);
        history.record_exchange("c1", "q1", "a1");
        history.record_exchange("c1", "q2", "a2");
        history.record_exchange("c1", "q3", "a3");

        let messages = history.get("c1");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "q2");
        assert_eq!(messages[3].content, "a3");
    }

    #[test]
    fn conversations_are_isolated() {
        let history = ConversationHistory::new(30);
        history.record_exchange("c1", "q", "a");

        assert!(history.get("c2").is_empty());
        assert_eq!(history.conversation_count(), 1);
    }
}
