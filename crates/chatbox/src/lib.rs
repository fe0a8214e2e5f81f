//! A chat widget for the terminal, backed by a `/api/chat` completion
//! endpoint.
//!
//! The crate includes the `chatbox` binary. You can also use it as a
//! library to put the same chat into your own host app.

#![deny(missing_docs)]

mod config;

pub use config::{Config, ConfigError};

/// Re-exports of [`chatbox_model`] crate.
pub mod model {
    pub use chatbox_model::*;
}

/// Re-exports of [`chatbox_core`] crate.
pub mod core {
    pub use chatbox_core::*;
}

/// Re-exports of [`chatbox_http_model`] crate.
pub mod http {
    pub use chatbox_http_model::*;
}

#[cfg(test)]
mod tests {
    use crate::model::{CompletionRequest, ErrorKind};

    #[test]
    fn test_model_types_are_reachable() {
        let req = CompletionRequest::new("hi");
        assert_eq!(req.input, "hi");
        assert!(ErrorKind::Timeout.is_transient());
    }
}
