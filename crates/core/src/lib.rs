//! Core logic of the chat widget: messages, the conversation state
//! machine, and the driver that talks to the completion service.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod chat;
mod completion_client;
pub mod controller;
pub mod conversation;
pub mod identity;
pub mod keymap;
pub mod message;

pub use chat::{Chat, ChatBuilder, FinishedRequest};
pub use completion_client::{CompletionClient, CompletionError, RetryPolicy};
