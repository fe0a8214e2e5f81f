//! Conversation-related types.

use crate::message::{Message, MessageId};

/// An ordered, chronological list of messages.
///
/// The list is append-only, except that a message can be replaced in
/// place (used to resolve placeholders) and the whole list can be cleared.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Returns the messages in chronological order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates over the messages in chronological order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Looks up a message by its identifier.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|msg| msg.id() == id)
    }

    pub(crate) fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    /// Replaces the message with the given identifier, keeping its
    /// position. Returns `false` if there is no such message.
    pub(crate) fn replace(&mut self, id: MessageId, msg: Message) -> bool {
        let Some(slot) = self.messages.iter_mut().find(|m| m.id() == id) else {
            return false;
        };
        *slot = msg;
        true
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
