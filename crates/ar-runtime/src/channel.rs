//! Connected message ports.
//!
//! A [`MessageChannelLike`] is a pair of ports: a message posted on one is
//! delivered to the handler of the other. Hosts that provide a native channel
//! can register it with [`MessageChannelFactory::with_native`]; otherwise the
//! factory builds a software channel backed by tokio tasks.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use ar_core::event::panic_message;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

/// The payload wrapper handed to a port's message handler.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEventLike<T> {
    /// The posted message.
    pub data: T,
}

/// Callback invoked for each message a port receives.
pub type MessageHandler<T> = Arc<dyn Fn(MessageEventLike<T>) + Send + Sync>;

/// Constructor for a host-provided channel.
pub type ChannelConstructor<T> = Arc<dyn Fn() -> MessageChannelLike<T> + Send + Sync>;

/// One end of a message channel.
pub trait MessagePortLike<T>: Send + Sync {
    /// Install or remove the handler for incoming messages.
    fn set_onmessage(&self, handler: Option<MessageHandler<T>>);

    /// Send a message to the other port.
    fn post_message(&self, data: T);

    /// Stop delivery in both directions.
    fn close(&self);
}

/// Two connected ports.
pub struct MessageChannelLike<T> {
    /// First end.
    pub port1: Arc<dyn MessagePortLike<T>>,
    /// Second end.
    pub port2: Arc<dyn MessagePortLike<T>>,
}

impl<T> Clone for MessageChannelLike<T> {
    fn clone(&self) -> Self {
        Self {
            port1: Arc::clone(&self.port1),
            port2: Arc::clone(&self.port2),
        }
    }
}

impl<T> fmt::Debug for MessageChannelLike<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageChannelLike").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> MessageChannelLike<T> {
    /// Build a software channel.
    ///
    /// Messages are queued and delivered later by a task per direction, in
    /// the order they were posted. A message arriving at a port with no
    /// handler is dropped. A handler that panics is logged and the port keeps
    /// delivering.
    ///
    /// The delivery tasks stop when the channel is closed or both ports are
    /// dropped. A handler that holds its own port keeps that port alive, so
    /// such channels run until [`MessagePortLike::close`] is called.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new() -> Self {
        let (closed, _) = watch::channel(false);
        let closed = Arc::new(closed);

        let inbox1 = Arc::new(Inbox::default());
        let inbox2 = Arc::new(Inbox::default());
        let (to_port2, from_port1) = mpsc::unbounded_channel();
        let (to_port1, from_port2) = mpsc::unbounded_channel();

        tokio::spawn(deliver(from_port1, Arc::clone(&inbox2), closed.subscribe()));
        tokio::spawn(deliver(from_port2, Arc::clone(&inbox1), closed.subscribe()));

        let port1 = SoftwarePort {
            inbox: inbox1,
            outgoing: to_port2,
            closed: Arc::clone(&closed),
        };
        let port2 = SoftwarePort {
            inbox: inbox2,
            outgoing: to_port1,
            closed,
        };
        Self {
            port1: Arc::new(port1),
            port2: Arc::new(port2),
        }
    }
}

impl<T: Send + 'static> Default for MessageChannelLike<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct Inbox<T> {
    handler: Mutex<Option<MessageHandler<T>>>,
}

impl<T> Default for Inbox<T> {
    fn default() -> Self {
        Self {
            handler: Mutex::new(None),
        }
    }
}

struct SoftwarePort<T> {
    inbox: Arc<Inbox<T>>,
    outgoing: mpsc::UnboundedSender<T>,
    closed: Arc<watch::Sender<bool>>,
}

impl<T: Send + 'static> MessagePortLike<T> for SoftwarePort<T> {
    fn set_onmessage(&self, handler: Option<MessageHandler<T>>) {
        *self.inbox.handler.lock() = handler;
    }

    fn post_message(&self, data: T) {
        if *self.closed.borrow() {
            tracing::trace!("message posted on a closed port");
            return;
        }
        // The receiving task only stops once the channel is closed.
        let _ = self.outgoing.send(data);
    }

    fn close(&self) {
        self.closed.send_replace(true);
    }
}

async fn deliver<T>(
    mut incoming: mpsc::UnboundedReceiver<T>,
    inbox: Arc<Inbox<T>>,
    mut closed: watch::Receiver<bool>,
) {
    loop {
        let data = tokio::select! {
            biased;
            _ = closed.changed() => break,
            data = incoming.recv() => match data {
                Some(data) => data,
                None => break,
            },
        };
        if *closed.borrow() {
            break;
        }
        let handler = inbox.handler.lock().clone();
        let Some(handler) = handler else {
            tracing::trace!("dropped message for port without handler");
            continue;
        };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(MessageEventLike { data }))) {
            tracing::warn!(
                panic = %panic_message(payload.as_ref()),
                "message handler panicked"
            );
        }
    }
}

/// Creates message channels, preferring a host-provided implementation.
pub struct MessageChannelFactory<T> {
    native: Option<ChannelConstructor<T>>,
}

impl<T> Clone for MessageChannelFactory<T> {
    fn clone(&self) -> Self {
        Self {
            native: self.native.clone(),
        }
    }
}

impl<T> fmt::Debug for MessageChannelFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageChannelFactory")
            .field("native", &self.native.is_some())
            .finish()
    }
}

impl<T: Send + 'static> Default for MessageChannelFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> MessageChannelFactory<T> {
    /// A factory that always builds software channels.
    pub fn new() -> Self {
        Self { native: None }
    }

    /// A factory that builds channels with the host's constructor.
    pub fn with_native<F>(constructor: F) -> Self
    where
        F: Fn() -> MessageChannelLike<T> + Send + Sync + 'static,
    {
        Self {
            native: Some(Arc::new(constructor)),
        }
    }

    /// True if channels come from the host's constructor.
    pub fn is_native(&self) -> bool {
        self.native.is_some()
    }

    /// Create a new channel.
    pub fn create(&self) -> MessageChannelLike<T> {
        match &self.native {
            Some(constructor) => constructor(),
            None => MessageChannelLike::new(),
        }
    }
}
