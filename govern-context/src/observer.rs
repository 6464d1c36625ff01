//! Snapshot observers
//!
//! Observers are plain callbacks. They run synchronously on the task that
//! publishes a snapshot, in registration order, with no lock held.
//!
//! Only one task delivers at a time. A snapshot published while a delivery is
//! running, including one published from inside a callback, is queued and
//! delivered by the running task. Snapshots reach observers in version order;
//! one that is older than a snapshot already queued is skipped.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::context::ContextSnapshot;

type Callback = Arc<dyn Fn(&Arc<ContextSnapshot>) + Send + Sync>;

#[derive(Default)]
struct ObserverList {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
    pending: VecDeque<Arc<ContextSnapshot>>,
    queued_version: u64,
    delivering: bool,
}

fn lock(list: &Mutex<ObserverList>) -> MutexGuard<'_, ObserverList> {
    list.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registered observers.
#[derive(Default)]
pub(crate) struct Observers {
    list: Arc<Mutex<ObserverList>>,
}

impl Observers {
    pub(crate) fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<ContextSnapshot>) + Send + Sync + 'static,
    {
        let mut list = lock(&self.list);
        list.next_id += 1;
        let id = list.next_id;
        list.entries.push((id, Arc::new(callback)));

        Subscription {
            id,
            list: Arc::downgrade(&self.list),
        }
    }

    /// Deliver `snapshot` to every observer.
    ///
    /// The list is copied per snapshot so callbacks may subscribe or
    /// unsubscribe.
    pub(crate) fn notify(&self, snapshot: &Arc<ContextSnapshot>) {
        {
            let mut list = lock(&self.list);
            if snapshot.version <= list.queued_version {
                return;
            }
            list.queued_version = snapshot.version;
            list.pending.push_back(snapshot.clone());
            if list.delivering {
                return;
            }
            list.delivering = true;
        }

        let _delivery = Delivery { list: &self.list };
        loop {
            let (snapshot, callbacks) = {
                let mut list = lock(&self.list);
                let Some(snapshot) = list.pending.pop_front() else {
                    list.delivering = false;
                    return;
                };
                let callbacks: Vec<Callback> = list
                    .entries
                    .iter()
                    .map(|(_, callback)| callback.clone())
                    .collect();
                (snapshot, callbacks)
            };

            for callback in callbacks {
                callback(&snapshot);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.list).entries.len()
    }
}

/// Hands delivery to the next publisher if a callback panics.
struct Delivery<'a> {
    list: &'a Mutex<ObserverList>,
}

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut list = lock(self.list);
            list.pending.clear();
            list.delivering = false;
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.len())
            .finish()
    }
}

/// Handle for a registered observer.
///
/// The observer is removed when the handle is dropped or
/// [`unsubscribe`](Subscription::unsubscribe) is called.
#[must_use = "dropping a Subscription removes the observer"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    list: Weak<Mutex<ObserverList>>,
}

impl Subscription {
    /// Identifier of the observer, unique within its context.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the observer.
    pub fn unsubscribe(self) {}

    /// Keep the observer registered for the lifetime of the context.
    pub fn detach(mut self) {
        self.list = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(list) = self.list.upgrade() {
            lock(&list).entries.retain(|(id, _)| *id != self.id);
        }
    }
}
