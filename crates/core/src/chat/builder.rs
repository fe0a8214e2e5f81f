use chatbox_model::CompletionProvider;

use super::Chat;
use crate::completion_client::{CompletionClient, RetryPolicy};
use crate::controller::ConversationEvent;

/// [`Chat`] builder.
pub struct ChatBuilder {
    pub(crate) client: CompletionClient,
    pub(crate) observers: Vec<Box<dyn Fn(&ConversationEvent) + Send + Sync>>,
}

impl ChatBuilder {
    /// Creates a new builder with the specified completion provider.
    #[inline]
    pub fn with_completion_provider<P: CompletionProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            client: CompletionClient::new(provider),
            observers: vec![],
        }
    }

    /// Sets how failed requests are retried. Requests are not retried by
    /// default.
    #[inline]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.client = self.client.with_retry(retry);
        self
    }

    /// Attaches a callback to be invoked after every mutation of the
    /// conversation.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&ConversationEvent) + Send + Sync + 'static,
    ) -> Self {
        self.observers.push(Box::new(on_change));
        self
    }

    /// Builds the chat.
    #[inline]
    pub fn build(self) -> Chat {
        Chat::from_builder(self)
    }
}
