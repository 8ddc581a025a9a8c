use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::subscription::{Detach, Subscription, SubscriptionId};

type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync + 'static>;

#[derive(Clone)]
struct Entry {
    id: SubscriptionId,
    handler: Handler,
}

#[derive(Default)]
struct Handlers {
    by_type: Mutex<HashMap<TypeId, Arc<Vec<Entry>>>>,
}

impl Detach for Handlers {
    fn detach(&self, id: SubscriptionId) -> bool {
        let released = {
            let mut by_type = self.by_type.lock();
            let found = by_type.iter_mut().find_map(|(key, list)| {
                let position = list.iter().position(|entry| entry.id == id)?;
                let entry = Arc::make_mut(list).remove(position);
                Some((*key, list.is_empty(), entry))
            });
            let Some((key, emptied, entry)) = found else {
                return false;
            };
            let list = if emptied { by_type.remove(&key) } else { None };
            (entry, list)
        };
        // Handlers may own subscriptions to this bus; drop them unlocked.
        drop(released);
        true
    }
}

/// Typed publish/subscribe channel for one-off events that are not state,
/// like "scroll to top" or "focus the search field".
///
/// Handlers are keyed by event type and called in registration order. As with
/// store subscribers, a publish works on a snapshot of the handler list, so
/// handlers may subscribe, unsubscribe or publish while it runs.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Handlers>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of type `E`. It stays registered until
    /// [`detach`](EventBus::detach) is called with the returned id.
    pub fn attach<E, F>(&self, handler: F) -> SubscriptionId
    where
        E: Any,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId::next();
        let handler: Handler = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });
        let mut by_type = self.handlers.by_type.lock();
        let list = by_type.entry(TypeId::of::<E>()).or_default();
        Arc::make_mut(list).push(Entry { id, handler });
        id
    }

    /// Register `handler` for events of type `E` until the returned guard is
    /// dropped.
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: Any,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.attach(handler);
        let handlers: Weak<Handlers> = Arc::downgrade(&self.handlers);
        let handlers: Weak<dyn Detach> = handlers;
        Subscription::new(handlers, id)
    }

    /// Unknown ids are ignored.
    pub fn detach(&self, id: SubscriptionId) {
        self.handlers.detach(id);
    }

    /// Deliver `event` to every handler registered for its type. Without
    /// handlers this does nothing.
    pub fn publish<E: Any>(&self, event: E) {
        let list = self
            .handlers
            .by_type
            .lock()
            .get(&TypeId::of::<E>())
            .cloned();
        let Some(list) = list else {
            log::trace!("no handlers for {}", std::any::type_name::<E>());
            return;
        };
        log::trace!(
            "publishing {} to {} handlers",
            std::any::type_name::<E>(),
            list.len()
        );
        let event: &dyn Any = &event;
        for entry in list.iter() {
            (entry.handler)(event);
        }
    }

    pub fn handler_count<E: Any>(&self) -> usize {
        self.handlers
            .by_type
            .lock()
            .get(&TypeId::of::<E>())
            .map_or(0, |list| list.len())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.handlers.by_type.lock().len())
            .finish()
    }
}
