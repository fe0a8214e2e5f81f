use chatbox_model::ErrorKind;
use serde::{Deserialize, Serialize};

/// The kind of failure a preset reply produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetFailure {
    /// The service looks unreachable.
    #[default]
    Transport,
    /// The request times out.
    Timeout,
    /// The reply is malformed.
    Decode,
}

impl From<PresetFailure> for ErrorKind {
    fn from(value: PresetFailure) -> Self {
        match value {
            PresetFailure::Transport => ErrorKind::Transport,
            PresetFailure::Timeout => ErrorKind::Timeout,
            PresetFailure::Decode => ErrorKind::Decode,
        }
    }
}

/// The preset reply for one user input.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetReply {
    /// The reply text.
    pub text: String,
    /// How long the reply takes, in milliseconds.
    pub delay_ms: Option<u64>,
    /// If set, the request will fail in the first `failures` attempts.
    /// `Some(0)` means the request will fail infinitely.
    pub failures: Option<u64>,
    /// What kind of failure to produce.
    #[serde(default)]
    pub failure: PresetFailure,
}

impl PresetReply {
    /// Creates a `PresetReply` that answers with `text`.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            delay_ms: None,
            failures: None,
            failure: PresetFailure::default(),
        }
    }

    /// Creates a `PresetReply` that always fails with `failure`.
    #[inline]
    pub fn failing(failure: PresetFailure) -> Self {
        Self {
            text: String::new(),
            delay_ms: None,
            failures: Some(0),
            failure,
        }
    }

    /// Sets how long the reply takes.
    #[inline]
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    /// Sets failure times before a successful reply. `0` means the reply
    /// will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }

    pub(crate) fn fails_on_attempt(&self, attempt: u64) -> bool {
        match self.failures {
            Some(0) => true,
            Some(failures) => attempt <= failures,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let reply = PresetReply::with_text("I have left a message for you.")
            .with_delay_ms(20)
            .with_failures(1);

        let serialized = serde_json::to_string(&reply).unwrap();
        let deserialized: PresetReply =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(reply, deserialized);
    }

    #[test]
    fn test_failure_defaults_to_transport() {
        let reply: PresetReply = serde_json::from_str(
            r#"{"text":"hi","delay_ms":null,"failures":2}"#,
        )
        .unwrap();
        assert_eq!(reply.failure, PresetFailure::Transport);
        assert!(reply.fails_on_attempt(1));
        assert!(reply.fails_on_attempt(2));
        assert!(!reply.fails_on_attempt(3));
    }

    #[test]
    fn test_failing_forever() {
        let reply = PresetReply::failing(PresetFailure::Decode);
        assert!(reply.fails_on_attempt(1));
        assert!(reply.fails_on_attempt(100));
        assert_eq!(ErrorKind::from(reply.failure), ErrorKind::Decode);
    }
}
