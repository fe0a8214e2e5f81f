use serde::{Deserialize, Serialize};

/// A complete reply from the completion provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Completion {
    /// The generated reply text.
    pub text: String,
}

impl Completion {
    /// Creates a completion with the given text.
    #[inline]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}
