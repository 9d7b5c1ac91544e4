use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use tokio::task::JoinHandle;

enum Entry {
    Closure(Box<dyn FnOnce() + Send>),
    Task(JoinHandle<()>),
    Group(Arc<DisposableGroup>),
}

impl Entry {
    fn dispose(self) {
        match self {
            Entry::Closure(f) => f(),
            Entry::Task(handle) => handle.abort(),
            Entry::Group(group) => group.dispose(),
        }
    }
}

/// A bag of subscriptions with atomic teardown.
///
/// Entries are closures, spawned task handles (aborted on dispose, so late
/// callbacks find their subscription gone rather than flagged off), and
/// child groups (disposed transitively). Dispose is idempotent; adding to a
/// group that is already disposed disposes the entry immediately.
#[derive(Default)]
pub struct DisposableGroup {
    // None once disposed.
    entries: Mutex<Option<Vec<Entry>>>,
}

impl DisposableGroup {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Some(Vec::new())),
        }
    }

    fn push(&self, entry: Entry) {
        let mut guard = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(entries) => entries.push(entry),
            None => {
                drop(guard);
                entry.dispose();
            }
        }
    }

    pub fn add(&self, on_dispose: impl FnOnce() + Send + 'static) {
        self.push(Entry::Closure(Box::new(on_dispose)));
    }

    pub fn add_task(&self, handle: JoinHandle<()>) {
        self.push(Entry::Task(handle));
    }

    pub fn add_child(&self, child: Arc<DisposableGroup>) {
        self.push(Entry::Group(child));
    }

    pub fn is_disposed(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Tears down every entry in insertion order. Safe to call repeatedly.
    pub fn dispose(&self) {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        // Entries run outside the lock so a dispose callback may re-enter.
        if let Some(entries) = entries {
            for entry in entries {
                entry.dispose();
            }
        }
    }
}

impl std::fmt::Debug for DisposableGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposableGroup")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
