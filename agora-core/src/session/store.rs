//! Ordered conversation history.

use crate::protocol::Message;

/// Append-only sequence of messages.
///
/// The only in-place mutation allowed is growing the content of an existing
/// message, which the dispatcher does for the active stream. At most one
/// message is streaming, and it is always the tail.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its index.
    ///
    /// A streaming tail stops streaming once anything is appended after it.
    pub fn push(&mut self, message: Message) -> usize {
        if let Some(tail) = self.messages.last_mut() {
            tail.streaming = false;
        }
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Index of the most recent message.
    pub fn tail_index(&self) -> Option<usize> {
        self.messages.len().checked_sub(1)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Message> {
        self.messages.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_returns_tail_index() {
        let mut store = MessageStore::new();
        assert!(store.is_empty());
        assert_eq!(store.tail_index(), None);

        assert_eq!(store.push(Message::system("one")), 0);
        assert_eq!(store.push(Message::assistant("A", "two")), 1);
        assert_eq!(store.tail_index(), Some(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.last().map(|m| m.content.as_str()), Some("two"));
        assert_eq!(store.get(0).map(|m| m.content.as_str()), Some("one"));
    }

    #[test]
    fn test_push_closes_streaming_tail() {
        let mut store = MessageStore::new();
        let mut first = Message::assistant("A", "");
        first.streaming = true;
        let mut second = Message::assistant("B", "");
        second.streaming = true;

        store.push(first);
        store.push(second);
        assert_eq!(store.iter().filter(|m| m.streaming).count(), 1);
        assert!(store.last().unwrap().streaming);

        store.push(Message::system("notice"));
        assert_eq!(store.iter().filter(|m| m.streaming).count(), 0);
    }
}
