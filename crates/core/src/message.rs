//! Message-related types.

use std::borrow::Cow;
use std::fmt::{self, Display};

use uuid::Uuid;

/// Text shown in place of a reply that hasn't arrived yet.
pub const LOADING_TEXT: &str = "Loading...";

/// Opaque identifier of a message.
///
/// Identifiers are generated when a message is created and are never
/// reused, not even after the conversation is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    #[inline]
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    /// A final message.
    #[default]
    Complete,
    /// A placeholder waiting for its reply.
    Pending,
    /// A placeholder whose request failed. The text describes the failure.
    Failed,
}

/// A single message in the conversation.
///
/// Messages are immutable. Resolving a placeholder replaces it with a new
/// message rather than editing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    text: String,
    is_user_message: bool,
    status: MessageStatus,
}

impl Message {
    /// Creates a message typed by the user.
    #[inline]
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::new(text.into(), true, MessageStatus::Complete)
    }

    /// Creates a reply from the completion service.
    #[inline]
    pub fn bot<S: Into<String>>(text: S) -> Self {
        Self::new(text.into(), false, MessageStatus::Complete)
    }

    pub(crate) fn placeholder() -> Self {
        Self::new(String::new(), false, MessageStatus::Pending)
    }

    pub(crate) fn failure<S: Into<String>>(text: S) -> Self {
        Self::new(text.into(), false, MessageStatus::Failed)
    }

    fn new(text: String, is_user_message: bool, status: MessageStatus) -> Self {
        Self {
            id: MessageId::new(),
            text,
            is_user_message,
            status,
        }
    }

    /// Returns the identifier of this message.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the raw text of this message.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` if the user typed this message.
    #[inline]
    pub fn is_user_message(&self) -> bool {
        self.is_user_message
    }

    /// Returns the status of this message.
    #[inline]
    pub fn status(&self) -> MessageStatus {
        self.status
    }

    /// Returns `true` if this is a placeholder still waiting for its reply.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    /// Returns the text as it should be displayed.
    ///
    /// Pending placeholders read [`LOADING_TEXT`], replies are trimmed and
    /// user input is shown verbatim.
    pub fn display_text(&self) -> Cow<'_, str> {
        if self.is_pending() {
            return Cow::Borrowed(LOADING_TEXT);
        }
        if self.is_user_message {
            Cow::Borrowed(&self.text)
        } else {
            Cow::Borrowed(self.text.trim())
        }
    }
}
