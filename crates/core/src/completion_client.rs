use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use chatbox_model::{
    Completion, CompletionProvider, CompletionProviderError, CompletionRequest,
};
use tracing::Instrument;

/// A type-erased error from any completion provider.
pub type CompletionError = Box<dyn CompletionProviderError>;

type CompleteResult = Result<Completion, CompletionError>;
type BoxedCompleteFuture = Pin<Box<dyn Future<Output = CompleteResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(CompletionRequest) -> BoxedCompleteFuture + Send + Sync>;

/// How failed requests are retried.
///
/// Only transient failures (see [`chatbox_model::ErrorKind::is_transient`])
/// are retried, with exponential backoff between attempts. The default
/// policy makes a single attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_interval: Duration,
    max_interval: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[inline]
    pub fn none() -> Self {
        Self::with_max_retries(0)
    }

    /// A policy that makes at most `max_retries` extra attempts.
    #[inline]
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(8),
        }
    }

    /// Sets the delay before the first retry.
    #[inline]
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self.max_interval = self.max_interval.max(interval);
        self
    }

    /// Returns the maximum number of extra attempts.
    #[inline]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self::none()
    }
}

/// A wrapper around a completion provider that provides a type-erased
/// interface for the other modules, and applies the retry policy.
#[derive(Clone)]
pub struct CompletionClient {
    handler_fn: HandlerFn,
    retry: RetryPolicy,
}

impl CompletionClient {
    /// Wraps `provider`.
    #[inline]
    pub fn new<P: CompletionProvider + 'static>(provider: P) -> Self {
        // Erase `P` so that the driver doesn't need a type parameter.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.complete(&req);
            Box::pin(async move {
                trace!("got a request: {:?}", req);
                fut.await.map_err(|err| {
                    error!("got an error: {err:?}");
                    Box::new(err) as CompletionError
                })
            })
        });
        Self {
            handler_fn,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the retry policy.
    #[inline]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the retry policy.
    #[inline]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends a request and returns the reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future drops the
    /// in-flight attempt and any pending retries.
    pub async fn complete(&self, req: CompletionRequest) -> CompleteResult {
        let span = trace_span!("completion client req");
        if self.retry.max_retries == 0 {
            return (self.handler_fn)(req).instrument(span).await;
        }

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.retry.initial_interval)
            .with_max_interval(self.retry.max_interval)
            .with_max_elapsed_time(None)
            .build();
        let max_retries = self.retry.max_retries;
        let mut attempt = 0u32;
        let operation = || {
            attempt += 1;
            let this_attempt = attempt;
            let is_last = this_attempt > max_retries;
            let fut = (self.handler_fn)(req.clone());
            async move {
                fut.await.map_err(|err| {
                    if is_last || !err.kind().is_transient() {
                        return backoff::Error::permanent(err);
                    }
                    debug!("attempt {this_attempt} failed, will retry: {err}");
                    backoff::Error::transient(err)
                })
            }
        };
        backoff::future::retry(backoff, operation)
            .instrument(span)
            .await
    }
}
