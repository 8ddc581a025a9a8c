use std::sync::Arc;

use parking_lot::Mutex;

use crate::subscription::{Detach, SubscriptionId};

pub(crate) type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Clone)]
struct Entry {
    id: SubscriptionId,
    callback: Callback,
}

/// Ordered list of subscriber callbacks.
///
/// The list lives behind an `Arc` so a notification pass can take a snapshot
/// in O(1). Adding or removing while a pass holds a snapshot copies the list
/// (`Arc::make_mut`), leaving the pass untouched; the change is seen from the
/// next snapshot on.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    entries: Mutex<Arc<Vec<Entry>>>,
}

/// Subscribers captured at the start of one notification pass.
pub(crate) struct Snapshot {
    entries: Arc<Vec<Entry>>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn notify_all(&self) {
        for entry in self.entries.iter() {
            (entry.callback)();
        }
    }
}

impl SubscriberRegistry {
    pub fn insert(&self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId::next();
        let mut entries = self.entries.lock();
        Arc::make_mut(&mut *entries).push(Entry { id, callback });
        id
    }

    pub fn remove(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut entries = self.entries.lock();
            let Some(position) = entries.iter().position(|entry| entry.id == id) else {
                return false;
            };
            Arc::make_mut(&mut *entries).remove(position)
        };
        // The callback may own subscriptions to this registry; drop it unlocked.
        drop(removed);
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entries: self.entries.lock().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Drops every callback. Returns how many there were.
    pub fn clear(&self) -> usize {
        let taken = std::mem::take(&mut *self.entries.lock());
        // Callbacks may own store handles; release them outside the lock.
        taken.len()
    }
}

impl Detach for SubscriberRegistry {
    fn detach(&self, id: SubscriptionId) -> bool {
        self.remove(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::subscription::Subscription;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Weak;

    fn push_label(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> Callback {
        let log = log.clone();
        Arc::new(move || log.lock().push(label))
    }

    #[test]
    fn test_notifies_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriberRegistry::default();
        registry.insert(push_label(&log, "a"));
        registry.insert(push_label(&log, "b"));
        registry.insert(push_label(&log, "c"));

        registry.snapshot().notify_all();

        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_snapshot_ignores_later_changes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriberRegistry::default();
        let a = registry.insert(push_label(&log, "a"));
        registry.insert(push_label(&log, "b"));

        let snapshot = registry.snapshot();
        assert!(registry.remove(a));
        registry.insert(push_label(&log, "c"));
        snapshot.notify_all();

        assert_eq!(*log.lock(), vec!["a", "b"]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 2);

        registry.snapshot().notify_all();
        assert_eq!(*log.lock(), vec!["a", "b", "b", "c"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = SubscriberRegistry::default();
        let id = registry.insert(Arc::new(|| {}));

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_clear_releases_callbacks() {
        let hits = Arc::new(AtomicUsize::new(0));
        let registry = SubscriberRegistry::default();
        let counter = hits.clone();
        registry.insert(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(registry.clear(), 1);
        registry.snapshot().notify_all();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(Arc::strong_count(&hits), 1);
    }

    #[test]
    fn test_removed_callback_may_own_subscriptions_here() {
        let registry: Arc<SubscriberRegistry> = Arc::default();
        let source: Weak<dyn Detach> = {
            let weak: Weak<SubscriberRegistry> = Arc::downgrade(&registry);
            weak
        };
        let child = Subscription::new(source, registry.insert(Arc::new(|| {})));
        let parent = registry.insert(Arc::new(move || {
            let _owned = &child;
        }));
        registry.snapshot().notify_all();

        assert!(registry.remove(parent));
        assert_eq!(registry.len(), 0);
    }
}
