//! A local fake completion service for testing purpose.

mod preset;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chatbox_model::{
    Completion, CompletionProvider, CompletionProviderError,
    CompletionRequest, ErrorKind,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl CompletionProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

struct Slot {
    reply: PresetReply,
    attempts: u64,
}

/// A local fake completion service for testing purpose.
///
/// Before sending requests, you need to register the preset replies, keyed
/// by the exact user input they answer. Replies are looked up by input
/// rather than by arrival order, so tests stay deterministic no matter how
/// the runtime schedules concurrent requests. An input without a preset
/// fails with [`ErrorKind::Other`].
///
/// Clones share the script and the request log, so a test can keep a
/// clone around to inspect what was sent.
#[derive(Clone, Default)]
pub struct TestCompletionProvider {
    script: Arc<Mutex<HashMap<String, Slot>>>,
    received: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl TestCompletionProvider {
    /// Registers the reply for `input`, replacing any previous one.
    #[inline]
    pub fn add_reply<S: Into<String>>(&mut self, input: S, reply: PresetReply) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(input.into(), Slot { reply, attempts: 0 });
    }

    /// Sets the delay of replies that don't specify their own.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every input received so far, retries included, in order.
    pub fn received_inputs(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_outcome(&self, input: &str) -> (Result<Completion, Error>, Duration) {
        let default_delay = self.delay.unwrap_or(Duration::from_millis(1));
        let mut script =
            self.script.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = script.get_mut(input) else {
            let err = Error {
                message: format!("no preset reply for {input:?}"),
                kind: ErrorKind::Other,
            };
            return (Err(err), default_delay);
        };

        slot.attempts += 1;
        let delay = slot
            .reply
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(default_delay);
        if slot.reply.fails_on_attempt(slot.attempts) {
            let err = Error {
                message: format!("preset failure on attempt {}", slot.attempts),
                kind: slot.reply.failure.into(),
            };
            return (Err(err), delay);
        }
        (Ok(Completion::new(slot.reply.text.clone())), delay)
    }
}

impl CompletionProvider for TestCompletionProvider {
    type Error = crate::Error;

    fn complete(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<Completion, Self::Error>> + Send + 'static
    {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req.input.clone());
        let (outcome, delay) = self.next_outcome(&req.input);
        async move {
            sleep(delay).await;
            outcome
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_replies_by_input() {
        let mut provider = TestCompletionProvider::default();
        provider.add_reply("Hi", PresetReply::with_text("Hello, world!"));
        provider.add_reply(
            "Slow",
            PresetReply::with_text("Sorry, I was busy.").with_delay_ms(200),
        );

        let slow = provider.complete(&CompletionRequest::new("Slow"));
        let fast = provider.complete(&CompletionRequest::new("Hi"));

        let started = Instant::now();
        assert_eq!(fast.await.unwrap().text, "Hello, world!");
        assert_eq!(slow.await.unwrap().text, "Sorry, I was busy.");
        assert!(started.elapsed() >= Duration::from_millis(200));

        assert_eq!(provider.received_inputs(), ["Slow", "Hi"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_then_success() {
        let mut provider = TestCompletionProvider::default();
        provider.add_reply(
            "Hi",
            PresetReply::with_text("Finally.").with_failures(2),
        );

        let req = CompletionRequest::new("Hi");
        for _ in 0..2 {
            let err = provider.complete(&req).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Transport);
        }
        assert_eq!(provider.complete(&req).await.unwrap().text, "Finally.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_input() {
        let provider = TestCompletionProvider::default();
        let err = provider
            .complete(&CompletionRequest::new("Anyone?"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().contains("Anyone?"));
    }
}
