//! An abstraction layer for completion services.
//!
//! This crate establishes a unified protocol for the chat widget to talk
//! to the remote service that turns user input into a reply, so that the
//! widget can switch between a real HTTP endpoint and an in-process fake
//! without touching the core code.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
