//! A strictly serialized command queue.
//!
//! Commands run one at a time in submission order. A command either finishes
//! immediately or hands back a future; the next command does not start until
//! that future settles. Failures (errors or panics) are reported through
//! [`CommandQueue::error_event`] and never stop the queue.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use ar_core::event::{Event, panic_message};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::config::QueueConfig;

/// What a command returns: a finished result, or a future to wait on.
pub enum Completion {
    /// The command already finished.
    Immediate(anyhow::Result<()>),
    /// The command finishes when the future resolves.
    Pending(BoxFuture<'static, anyhow::Result<()>>),
}

impl Completion {
    /// A successfully finished command.
    pub fn ok() -> Self {
        Self::Immediate(Ok(()))
    }

    /// Wrap a future as a pending completion.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }
}

impl From<anyhow::Result<()>> for Completion {
    fn from(result: anyhow::Result<()>) -> Self {
        Self::Immediate(result)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(result) => f.debug_tuple("Immediate").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A command that failed inside the queue.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command returned an error, either directly or from its future.
    #[error("command failed: {0:#}")]
    Failed(#[source] anyhow::Error),

    /// The command or its future panicked.
    #[error("command panicked: {0}")]
    Panicked(String),
}

type Command = Box<dyn FnOnce() -> Completion + Send>;

struct QueuedCommand<U> {
    command: Command,
    user_data: U,
}

struct QueueState<U> {
    queue: VecDeque<QueuedCommand<U>>,
    current_user_data: Option<U>,
    /// A command is in flight. Only one executor task runs while this is set.
    pending: bool,
}

struct Shared<U> {
    state: Mutex<QueueState<U>>,
    error_event: Event<CommandError>,
    idle: Notify,
    label: String,
}

/// Executes commands one at a time, in the order they were pushed.
///
/// Each command carries user data of type `U`; [`CommandQueue::current_user_data`]
/// returns the data of the running command, or of the last one if idle.
/// Cloning the queue yields another handle to the same queue.
pub struct CommandQueue<U = ()> {
    shared: Arc<Shared<U>>,
}

impl<U> Clone for CommandQueue<U> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<U> fmt::Debug for CommandQueue<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("CommandQueue")
            .field("label", &self.shared.label)
            .field("queued", &state.queue.len())
            .field("pending", &state.pending)
            .finish()
    }
}

impl<U: Clone + Send + 'static> Default for CommandQueue<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Clone + Send + 'static> CommandQueue<U> {
    /// Create a queue with the default configuration.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Create a queue.
    ///
    /// Unless disabled in `config`, a listener is registered on the error
    /// event that logs failures while it is the only listener.
    pub fn with_config(config: QueueConfig) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                current_user_data: None,
                pending: false,
            }),
            error_event: Event::new(),
            idle: Notify::new(),
            label: config.label,
        });

        if config.log_errors {
            let weak = Arc::downgrade(&shared);
            shared.error_event.add_event_listener(move |error: &CommandError| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                if shared.error_event.number_of_listeners() == 1 {
                    tracing::error!(queue = %shared.label, %error, "command failed");
                }
            });
        }

        Self { shared }
    }

    /// Append a command. If no command is in flight, execution starts on a
    /// new task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime while the queue is idle. The
    /// queue is left unchanged in that case.
    pub fn push<F>(&self, command: F, user_data: U)
    where
        F: FnOnce() -> Completion + Send + 'static,
    {
        let runtime = {
            let mut state = self.shared.state.lock();
            let runtime = if state.pending {
                None
            } else {
                match Handle::try_current() {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        drop(state);
                        panic!("command queue \"{}\" needs a tokio runtime: {e}", self.shared.label);
                    }
                }
            };
            state.queue.push_back(QueuedCommand {
                command: Box::new(command),
                user_data,
            });
            state.pending = true;
            runtime
        };
        if let Some(runtime) = runtime {
            runtime.spawn(execute(Arc::clone(&self.shared)));
        }
    }

    /// Append a command that finishes synchronously.
    pub fn push_sync<F>(&self, command: F, user_data: U)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.push(move || Completion::Immediate(command()), user_data);
    }

    /// Append a command whose work completes when the returned future resolves.
    pub fn push_async<F, Fut>(&self, command: F, user_data: U)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.push(move || Completion::pending(command()), user_data);
    }

    /// Discard every command that has not started. A command in flight
    /// still runs to completion.
    pub fn clear(&self) {
        let dropped = {
            let mut state = self.shared.state.lock();
            std::mem::take(&mut state.queue)
        };
        tracing::debug!(queue = %self.shared.label, dropped = dropped.len(), "cleared queue");
    }

    /// User data of the running command, or of the last command run.
    pub fn current_user_data(&self) -> Option<U> {
        self.shared.state.lock().current_user_data.clone()
    }

    /// Raised once for every failing command.
    pub fn error_event(&self) -> &Event<CommandError> {
        &self.shared.error_event
    }

    /// Number of commands waiting to start.
    pub fn len(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// True if no commands are waiting to start.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().queue.is_empty()
    }

    /// True while a command is in flight.
    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().pending
    }

    /// Wait until no command is in flight and none are waiting.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_pending() {
                return;
            }
            notified.await;
        }
    }
}

/// Drain the queue. Runs as a single task while `pending` is set.
async fn execute<U>(shared: Arc<Shared<U>>) {
    loop {
        let (command, remaining) = {
            let mut state = shared.state.lock();
            let Some(next) = state.queue.pop_front() else {
                state.pending = false;
                drop(state);
                shared.idle.notify_waiters();
                return;
            };
            state.current_user_data = Some(next.user_data);
            (next.command, state.queue.len())
        };

        tracing::debug!(queue = %shared.label, remaining, "running command");
        match run(command).await {
            Ok(()) => tracing::debug!(queue = %shared.label, "command finished"),
            Err(error) => {
                tracing::debug!(queue = %shared.label, %error, "command failed");
                shared.error_event.raise_event(&error);
            }
        }
    }
}

async fn run(command: Command) -> Result<(), CommandError> {
    let completion = catch_unwind(AssertUnwindSafe(command))
        .map_err(|payload| CommandError::Panicked(panic_message(payload.as_ref())))?;

    match completion {
        Completion::Immediate(result) => result.map_err(CommandError::Failed),
        Completion::Pending(future) => AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .map_err(|payload| CommandError::Panicked(panic_message(payload.as_ref())))?
            .map_err(CommandError::Failed),
    }
}
