use serde::{Deserialize, Serialize};

/// A request to be sent to the completion provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The raw user input, exactly as it was submitted.
    pub input: String,
}

impl CompletionRequest {
    /// Creates a request for the given input.
    #[inline]
    pub fn new<S: Into<String>>(input: S) -> Self {
        Self {
            input: input.into(),
        }
    }
}
