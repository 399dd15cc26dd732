#![forbid(unsafe_code)]

//! Ordered listener dispatch with per-listener failure isolation.
//!
//! [`ListenerRegistry`] stores callbacks keyed either to a specific event
//! kind or to the wildcard ("all kinds"). Dispatch walks the registrations in
//! the order they were added, so a wildcard registered between two
//! kind-specific listeners runs between them.
//!
//! # Invariants
//!
//! 1. **Registration order**: listeners run in the order they were added.
//! 2. **Isolation**: a listener that panics is caught; the remaining
//!    listeners in the same dispatch still run.
//! 3. **Stable ids**: [`ListenerId`]s are never reused within one registry.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Listener panic | Bug in subscriber | Caught, counted, logged at `warn` |
//! | Unknown id on `remove` | Already removed | Returns `false` |

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;

/// Opaque identifier returned when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Return the numeric id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Listeners invoked (including ones that failed).
    pub invoked: usize,
    /// Listeners that panicked.
    pub failed: usize,
}

type Callback<E> = Box<dyn FnMut(&E)>;

struct ListenerEntry<K, E> {
    id: ListenerId,
    filter: Option<K>,
    callback: Callback<E>,
}

/// Callback table for one event stream.
pub struct ListenerRegistry<K, E> {
    entries: Vec<ListenerEntry<K, E>>,
    next_id: u64,
    total_failures: u64,
}

impl<K: fmt::Debug, E> fmt::Debug for ListenerRegistry<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.entries.len())
            .field("total_failures", &self.total_failures)
            .finish()
    }
}

impl<K, E> Default for ListenerRegistry<K, E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            total_failures: 0,
        }
    }
}

impl<K: Copy + Eq + fmt::Debug, E> ListenerRegistry<K, E> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind.
    pub fn on(&mut self, kind: K, callback: impl FnMut(&E) + 'static) -> ListenerId {
        self.push(Some(kind), Box::new(callback))
    }

    /// Register a listener for every kind.
    pub fn on_any(&mut self, callback: impl FnMut(&E) + 'static) -> ListenerId {
        self.push(None, Box::new(callback))
    }

    /// Remove a listener. Returns `false` if the id is unknown.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failures observed over the registry's lifetime.
    #[must_use]
    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    /// Deliver `event` to every listener registered for `kind` or for all
    /// kinds, in registration order.
    pub fn dispatch(&mut self, kind: K, event: &E) -> DispatchReport {
        let mut report = DispatchReport::default();
        for entry in &mut self.entries {
            if entry.filter.is_some_and(|filter| filter != kind) {
                continue;
            }
            report.invoked += 1;
            let outcome = catch_unwind(AssertUnwindSafe(|| (entry.callback)(event)));
            if outcome.is_err() {
                report.failed += 1;
                warn!(
                    listener = entry.id.get(),
                    kind = ?kind,
                    "listener panicked; continuing dispatch"
                );
            }
        }
        self.total_failures = self.total_failures.saturating_add(report.failed as u64);
        report
    }

    fn push(&mut self, filter: Option<K>, callback: Callback<E>) -> ListenerId {
        self.next_id = self.next_id.saturating_add(1);
        let id = ListenerId(self.next_id);
        self.entries.push(ListenerEntry {
            id,
            filter,
            callback,
        });
        id
    }
}
