//! The conversation state machine.
//!
//! [`ConversationController`] owns the messages and the draft, and knows
//! nothing about networking: [`submit`](ConversationController::submit)
//! hands out a [`Ticket`] for the request the caller is expected to send,
//! and [`resolve`](ConversationController::resolve) applies its outcome
//! later. Outcomes are matched to placeholders by identifier, so replies
//! may arrive in any order, and outcomes of tickets invalidated by
//! [`clear`](ConversationController::clear) are dropped.


use std::collections::HashSet;
use std::fmt::{self, Debug, Display};

use chatbox_model::ErrorKind;

use crate::conversation::Conversation;
use crate::message::{Message, MessageId};

/// Correlates a completion request with the placeholder it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    placeholder: MessageId,
    generation: u64,
}

impl Ticket {
    /// Returns the identifier of the placeholder this ticket resolves.
    #[inline]
    pub fn placeholder(&self) -> MessageId {
        self.placeholder
    }

    /// Returns the generation of the conversation the ticket was issued in.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A submitted draft, ready to be sent to the completion service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// The ticket to resolve once the reply arrives.
    pub ticket: Ticket,
    /// The submitted text.
    pub input: String,
}

/// Describes why a request failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    kind: ErrorKind,
    message: String,
}

impl Failure {
    /// Creates a failure of the given kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the kind of this failure.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the underlying error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

/// A mutation of the conversation, delivered to observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConversationEvent {
    /// A user message and its placeholder were appended.
    Submitted {
        /// The user message.
        user: MessageId,
        /// The placeholder waiting for the reply.
        placeholder: MessageId,
    },
    /// A placeholder was replaced by a reply or a failure message.
    Resolved {
        /// The replaced placeholder.
        placeholder: MessageId,
        /// The message that took its place.
        message: MessageId,
    },
    /// All messages were removed.
    Cleared,
}

/// The result of [`ConversationController::resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolveOutcome {
    /// The placeholder was replaced.
    Applied,
    /// The ticket no longer matches a pending placeholder, nothing changed.
    Stale,
}

type Observer = Box<dyn Fn(&ConversationEvent) + Send + Sync>;

/// Holds the conversation, the draft and the set of unresolved requests.
pub struct ConversationController {
    conversation: Conversation,
    draft: String,
    pending: HashSet<MessageId>,
    generation: u64,
    observers: Vec<Observer>,
}

impl ConversationController {
    /// Creates a controller with an empty conversation and draft.
    #[inline]
    pub fn new() -> Self {
        Self {
            conversation: Conversation::default(),
            draft: String::new(),
            pending: HashSet::new(),
            generation: 0,
            observers: Vec::new(),
        }
    }

    /// Registers a callback invoked synchronously after every mutation of
    /// the conversation, exactly once per mutation.
    #[inline]
    pub fn subscribe(
        &mut self,
        observer: impl Fn(&ConversationEvent) + Send + Sync + 'static,
    ) {
        self.observers.push(Box::new(observer));
    }

    /// Returns the conversation.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the messages in chronological order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Returns the not-yet-submitted text.
    #[inline]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the draft.
    #[inline]
    pub fn on_input_change<S: Into<String>>(&mut self, text: S) {
        self.draft = text.into();
    }

    /// Returns `true` if any placeholder is still waiting for its reply.
    #[inline]
    pub fn is_request_in_flight(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Returns the number of placeholders waiting for their replies.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns the current generation, bumped by every [`clear`](Self::clear).
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Submits the draft.
    ///
    /// Appends the user message and an empty placeholder, then clears the
    /// draft so the next message can be typed while this one is in flight.
    /// An empty draft is submitted as well.
    pub fn submit(&mut self) -> Submission {
        let input = std::mem::take(&mut self.draft);

        let user = Message::user(input.clone());
        let placeholder = Message::placeholder();
        let event = ConversationEvent::Submitted {
            user: user.id(),
            placeholder: placeholder.id(),
        };
        let ticket = Ticket {
            placeholder: placeholder.id(),
            generation: self.generation,
        };

        self.conversation.push(user);
        self.conversation.push(placeholder);
        self.pending.insert(ticket.placeholder);
        debug!(
            "submitted {} chars, placeholder {}",
            input.len(),
            ticket.placeholder
        );
        self.notify(&event);

        Submission { ticket, input }
    }

    /// Resolves the placeholder of `ticket` with a reply or a failure.
    ///
    /// A failure still resolves the placeholder, into a message describing
    /// what went wrong.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<String, Failure>,
    ) -> ResolveOutcome {
        if ticket.generation != self.generation
            || !self.pending.remove(&ticket.placeholder)
        {
            debug!("discarding stale reply for {}", ticket.placeholder);
            return ResolveOutcome::Stale;
        }

        let message = match outcome {
            Ok(text) => Message::bot(text),
            Err(failure) => {
                warn!("request for {} failed: {failure}", ticket.placeholder);
                Message::failure(format!("Something went wrong. {failure}"))
            }
        };
        let event = ConversationEvent::Resolved {
            placeholder: ticket.placeholder,
            message: message.id(),
        };
        if !self.conversation.replace(ticket.placeholder, message) {
            // Pending placeholders are always in the conversation.
            error!("placeholder {} is missing", ticket.placeholder);
            return ResolveOutcome::Stale;
        }
        self.notify(&event);
        ResolveOutcome::Applied
    }

    /// Removes every message, whether or not requests are in flight.
    ///
    /// Returns the tickets that were still pending. They are invalidated,
    /// so their replies will be discarded, and callers may cancel the
    /// corresponding requests.
    pub fn clear(&mut self) -> Vec<Ticket> {
        let generation = self.generation;
        self.generation += 1;
        let cancelled: Vec<_> = self
            .pending
            .drain()
            .map(|placeholder| Ticket {
                placeholder,
                generation,
            })
            .collect();
        self.conversation.clear();
        debug!("cleared, {} requests cancelled", cancelled.len());
        self.notify(&ConversationEvent::Cleared);
        cancelled
    }

    fn notify(&self, event: &ConversationEvent) {
        trace!("notifying {} observers: {event:?}", self.observers.len());
        for observer in &self.observers {
            observer(event);
        }
    }
}

impl Default for ConversationController {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ConversationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationController")
            .field("conversation", &self.conversation)
            .field("draft", &self.draft)
            .field("pending", &self.pending)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
