mod builder;

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{self, Display};
use std::panic::AssertUnwindSafe;

use chatbox_model::{
    Completion, CompletionProviderError, CompletionRequest, ErrorKind,
};
use futures_util::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::completion_client::{CompletionClient, CompletionError};
use crate::controller::{
    ConversationController, ConversationEvent, Failure, ResolveOutcome,
    Submission, Ticket,
};
use crate::keymap::{EnterAction, enter_action};
use crate::message::{Message, MessageId};
pub use builder::ChatBuilder;

/// The outcome of one completion request, waiting to be applied.
#[derive(Debug)]
pub struct FinishedRequest {
    ticket: Ticket,
    result: Result<Completion, CompletionError>,
}

impl FinishedRequest {
    /// Returns the ticket of the request.
    #[inline]
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Returns `true` if the request succeeded.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// A chat widget's state together with the machinery to talk to the
/// completion service.
///
/// All state is owned by whoever owns the `Chat`, typically a UI event
/// loop. Each submission spawns one request task, and the task reports
/// back through a channel instead of touching the state. The owner picks
/// the results up with [`next_finished`](Self::next_finished) and applies
/// them with [`apply`](Self::apply), so mutations only ever happen on the
/// owner's side.
///
/// Dropping the `Chat` cancels every request still in flight.
pub struct Chat {
    controller: ConversationController,
    client: CompletionClient,
    running_tasks: HashMap<MessageId, JoinHandle<()>>,
    finished_tx: mpsc::UnboundedSender<FinishedRequest>,
    finished_rx: mpsc::UnboundedReceiver<FinishedRequest>,
}

impl Chat {
    fn from_builder(builder: ChatBuilder) -> Self {
        let ChatBuilder { client, observers } = builder;

        let mut controller = ConversationController::new();
        for observer in observers {
            controller.subscribe(observer);
        }
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            client,
            running_tasks: HashMap::new(),
            finished_tx,
            finished_rx,
        }
    }

    /// Returns the underlying controller.
    #[inline]
    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    /// Returns the messages in chronological order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        self.controller.messages()
    }

    /// Returns the not-yet-submitted text.
    #[inline]
    pub fn draft(&self) -> &str {
        self.controller.draft()
    }

    /// Replaces the draft.
    #[inline]
    pub fn on_input_change<S: Into<String>>(&mut self, text: S) {
        self.controller.on_input_change(text);
    }

    /// Returns `true` if any reply is still awaited.
    #[inline]
    pub fn is_request_in_flight(&self) -> bool {
        self.controller.is_request_in_flight()
    }

    /// Registers a callback invoked after every mutation of the
    /// conversation.
    #[inline]
    pub fn subscribe(
        &mut self,
        observer: impl Fn(&ConversationEvent) + Send + Sync + 'static,
    ) {
        self.controller.subscribe(observer);
    }

    /// Submits the draft and sends it to the completion service.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn submit(&mut self) -> Ticket {
        let Submission { ticket, input } = self.controller.submit();

        let client = self.client.clone();
        let finished_tx = self.finished_tx.clone();
        let span = debug_span!("request", placeholder = %ticket.placeholder());
        let task = tokio::spawn(
            async move {
                let req = CompletionRequest::new(input);
                // A panicking provider still resolves its placeholder.
                let result = AssertUnwindSafe(client.complete(req))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        error!("request task panicked");
                        Err(Box::new(TaskPanicked) as CompletionError)
                    });
                trace!("finished, ok: {}", result.is_ok());
                // The receiver only goes away with the `Chat` itself.
                finished_tx.send(FinishedRequest { ticket, result }).ok();
            }
            .instrument(span),
        );
        self.running_tasks.insert(ticket.placeholder(), task);
        ticket
    }

    /// Handles Enter in the input box: submits the draft, or appends a
    /// newline to it when the modifier is held.
    pub fn press_enter(&mut self, modifier_held: bool) -> EnterAction {
        let action = enter_action(modifier_held);
        match action {
            EnterAction::Submit => {
                self.submit();
            }
            EnterAction::InsertNewline => {
                let mut draft = self.controller.draft().to_owned();
                draft.push('\n');
                self.controller.on_input_change(draft);
            }
        }
        action
    }

    /// Removes every message and cancels the requests in flight.
    pub fn clear(&mut self) {
        for ticket in self.controller.clear() {
            if let Some(task) = self.running_tasks.remove(&ticket.placeholder()) {
                task.abort();
            }
        }
    }

    /// Waits for the next finished request.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe, it can be used in `tokio::select!`
    /// without losing results.
    #[inline]
    pub async fn next_finished(&mut self) -> Option<FinishedRequest> {
        self.finished_rx.recv().await
    }

    /// Applies a finished request to the conversation.
    pub fn apply(&mut self, finished: FinishedRequest) -> ResolveOutcome {
        let FinishedRequest { ticket, result } = finished;
        self.running_tasks.remove(&ticket.placeholder());
        let outcome = result
            .map(|completion| completion.text)
            .map_err(|err| Failure::new(err.kind(), err.to_string()));
        self.controller.resolve(ticket, outcome)
    }

    /// Applies finished requests until no reply is awaited anymore.
    pub async fn settle(&mut self) {
        while self.controller.is_request_in_flight() {
            let Some(finished) = self.next_finished().await else {
                break;
            };
            self.apply(finished);
        }
    }
}

/// Stands in for the result of a request task that panicked.
#[derive(Debug)]
struct TaskPanicked;

impl Display for TaskPanicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the request task panicked")
    }
}

impl Error for TaskPanicked {}

impl CompletionProviderError for TaskPanicked {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl Drop for Chat {
    fn drop(&mut self) {
        for (_, task) in self.running_tasks.drain() {
            task.abort();
        }
    }
}
