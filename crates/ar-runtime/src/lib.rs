//! Runtime utilities for augmented-reality applications.
//!
//! [`CommandQueue`] runs asynchronous or synchronous commands strictly one at
//! a time, in submission order, and reports failures through an
//! [`ar_core::Event`]. [`MessageChannelFactory`] hands out connected message
//! ports, falling back to a software channel when the host provides none.
//! [`UrlResolver`] resolves and parses URLs against a document base.

/// Message ports and channels.
pub mod channel;
/// Configuration types for command queues.
pub mod config;
/// Error types for the runtime crate.
pub mod error;
/// The serialized command queue.
pub mod queue;
/// URL resolution and parsing.
pub mod urls;

pub use channel::{MessageChannelFactory, MessageChannelLike, MessageEventLike, MessagePortLike};
pub use config::QueueConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use queue::{CommandError, CommandQueue, Completion};
pub use urls::{ParsedUrl, UrlResolver};
