use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to one registered callback.
///
/// Ids are unique for the whole process and never reused, so unsubscribing
/// a stale id can never remove someone else's callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Something callbacks can be removed from.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> bool;
}

/// Owned subscription. Unsubscribes when dropped.
///
/// Only holds a weak reference to its registry, so it never keeps a store or
/// event bus alive.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    source: Option<Weak<dyn Detach>>,
    id: SubscriptionId,
}

impl Subscription {
    pub(crate) fn new(source: Weak<dyn Detach>, id: SubscriptionId) -> Self {
        Self {
            source: Some(source),
            id,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the callback now. Calling it again is a no-op.
    pub fn unsubscribe(&mut self) {
        if let Some(source) = self.source.take().and_then(|weak| weak.upgrade()) {
            source.detach(self.id);
        }
    }

    /// Gives up ownership: the callback stays registered and the plain id is
    /// returned for manual unsubscription.
    pub fn detach(mut self) -> SubscriptionId {
        self.source = None;
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.source.is_some())
            .finish()
    }
}

/// A bag of subscriptions that are all dropped together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    list: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.list.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }
}

impl std::ops::AddAssign<Subscription> for SubscriptionSet {
    fn add_assign(&mut self, rhs: Subscription) {
        self.push(rhs);
    }
}

impl Extend<Subscription> for SubscriptionSet {
    fn extend<T: IntoIterator<Item = Subscription>>(&mut self, iter: T) {
        self.list.extend(iter);
    }
}

impl FromIterator<Subscription> for SubscriptionSet {
    fn from_iter<T: IntoIterator<Item = Subscription>>(iter: T) -> Self {
        Self {
            list: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        detached: Mutex<Vec<SubscriptionId>>,
    }

    impl Detach for Recorder {
        fn detach(&self, id: SubscriptionId) -> bool {
            self.detached.lock().push(id);
            true
        }
    }

    fn subscription_on(recorder: &Arc<Recorder>) -> Subscription {
        let source: Arc<dyn Detach> = recorder.clone();
        Subscription::new(Arc::downgrade(&source), SubscriptionId::next())
    }

    #[test]
    fn test_ids_are_unique() {
        let a = SubscriptionId::next();
        let b = SubscriptionId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_drop_detaches_once() {
        let recorder = Arc::new(Recorder::default());
        let mut subscription = subscription_on(&recorder);
        let id = subscription.id();

        subscription.unsubscribe();
        drop(subscription);

        assert_eq!(*recorder.detached.lock(), vec![id]);
    }

    #[test]
    fn test_detach_keeps_callback() {
        let recorder = Arc::new(Recorder::default());
        let id = subscription_on(&recorder).detach();

        assert!(recorder.detached.lock().is_empty());
        assert!(id > SubscriptionId(0));
    }

    #[test]
    fn test_set_clears_everything() {
        let recorder = Arc::new(Recorder::default());
        let mut set: SubscriptionSet = (0..2).map(|_| subscription_on(&recorder)).collect();
        set += subscription_on(&recorder);
        assert_eq!(set.len(), 3);

        set.clear();

        assert!(set.is_empty());
        assert_eq!(recorder.detached.lock().len(), 3);
    }

    #[test]
    fn test_outliving_source_is_harmless() {
        let recorder = Arc::new(Recorder::default());
        let subscription = subscription_on(&recorder);
        drop(recorder);
        drop(subscription);
    }
}
