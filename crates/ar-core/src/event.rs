use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;
type Registry<T> = Mutex<Vec<Registration<T>>>;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying one listener registration.
///
/// Registering the same closure twice yields two distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Registration<T> {
    id: ListenerId,
    listener: Listener<T>,
}

/// Removes exactly one registration from the event that created it.
///
/// Dropping the callback without calling [`RemoveCallback::remove`] leaves
/// the listener registered.
pub struct RemoveCallback<T> {
    id: ListenerId,
    registry: Weak<Registry<T>>,
}

impl<T> RemoveCallback<T> {
    /// The registration this callback removes.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the registration. Returns false if it was already removed or
    /// the event no longer exists.
    pub fn remove(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => remove_from(&registry, self.id),
            None => false,
        }
    }
}

impl<T> fmt::Debug for RemoveCallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveCallback").field("id", &self.id).finish()
    }
}

/// A multi-listener publish/subscribe primitive.
///
/// Listeners run synchronously in registration order. [`Event::raise_event`]
/// snapshots the registrations before invoking them: a listener added or
/// removed while an event is being raised takes effect from the next raise.
pub struct Event<T> {
    registry: Arc<Registry<T>>,
}

impl<T> Event<T> {
    /// Create an event with no listeners.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of listeners currently subscribed.
    pub fn number_of_listeners(&self) -> usize {
        self.registry.lock().len()
    }

    /// Register a listener. The returned callback removes this registration only.
    pub fn add_event_listener<F>(&self, listener: F) -> RemoveCallback<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        self.registry.lock().push(Registration {
            id,
            listener: Arc::new(listener),
        });
        RemoveCallback {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Remove one registration. Returns true if it was registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        remove_from(&self.registry, id)
    }

    /// Invoke every listener with `data`.
    ///
    /// A panicking listener is logged and skipped; the remaining listeners
    /// still run.
    pub fn raise_event(&self, data: &T) {
        let listeners: Vec<(ListenerId, Listener<T>)> = self
            .registry
            .lock()
            .iter()
            .map(|r| (r.id, Arc::clone(&r.listener)))
            .collect();

        for (id, listener) in listeners {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(data))) {
                tracing::warn!(
                    listener = ?id,
                    panic = %panic_message(payload.as_ref()),
                    "event listener panicked"
                );
            }
        }
    }
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("listeners", &self.number_of_listeners())
            .finish()
    }
}

fn remove_from<T>(registry: &Registry<T>, id: ListenerId) -> bool {
    let mut registrations = registry.lock();
    match registrations.iter().position(|r| r.id == id) {
        Some(index) => {
            registrations.remove(index);
            true
        }
        None => false,
    }
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
