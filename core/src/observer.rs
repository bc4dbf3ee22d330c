//! Subscribers to availability changes and the registry that fans them out.
//!
//! The registry never calls an observer while holding its lock: [`ObserverRegistry::notify_all`]
//! copies the current list, releases the lock, then walks the copy. An observer
//! may therefore add or remove observers (itself included) from inside its own
//! callback without deadlocking.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use hostmon_common::Endpoint;
use tracing::error;

/// Payload handed to every observer when availability flips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub endpoint: Endpoint,
    pub interval: Duration,
    pub available: bool,
}

/// Receives availability changes of a monitor.
///
/// Called from the monitor's worker thread, never from the thread that
/// registered the observer. Implementations must not block indefinitely: the
/// next probe cycle waits for every observer to return.
pub trait Observer: Send + Sync {
    fn state_change(&self, change: &StateChange);
}

impl<F> Observer for F
where
    F: Fn(&StateChange) + Send + Sync,
{
    fn state_change(&self, change: &StateChange) {
        self(change)
    }
}

/// Thread-safe list of observers.
///
/// Duplicates are allowed: an observer added twice is notified twice.
/// Removal is by identity (the `Arc` allocation), and removes every copy.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Mutex<Vec<Arc<dyn Observer>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, observer: Arc<dyn Observer>) {
        self.lock().push(observer);
    }

    /// Removes every entry sharing `observer`'s allocation.
    ///
    /// Returns how many entries were removed; removing an unknown observer is
    /// not an error.
    pub fn remove<O>(&self, observer: &Arc<O>) -> usize
    where
        O: Observer + ?Sized,
    {
        let needle: *const () = Arc::as_ptr(observer) as *const ();
        let mut observers = self.lock();
        let before: usize = observers.len();
        observers.retain(|entry| Arc::as_ptr(entry) as *const () != needle);
        before - observers.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Point-in-time copy of the registered observers, in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<dyn Observer>> {
        self.lock().clone()
    }

    /// Delivers `change` to every observer registered at call time.
    ///
    /// A panicking observer is logged and skipped; the remaining observers
    /// still receive the change. Returns the number of observers that
    /// completed without panicking.
    pub fn notify_all(&self, change: &StateChange) -> usize {
        let observers: Vec<Arc<dyn Observer>> = self.snapshot();
        let mut delivered: usize = 0;

        for observer in observers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.state_change(change)));
            match outcome {
                Ok(()) => delivered += 1,
                Err(_) => error!(
                    "Observer panicked while handling {} becoming {}",
                    change.endpoint,
                    if change.available { "available" } else { "unavailable" }
                ),
            }
        }

        delivered
    }

    // Observers never run under this lock, so a poisoned lock can only come
    // from a panic inside a Vec operation and the list is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn Observer>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
