use crate::store::Store;
use crate::subscription::SubscriptionSet;

/// Groups observations of one store so they can be forgotten together,
/// typically owned by a view for as long as it is on screen.
pub struct StateObserver<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    store: Option<Store<State, Action>>,
    connections: SubscriptionSet,
}

impl<State, Action> StateObserver<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    pub fn new(store: &Store<State, Action>) -> Self {
        Self {
            store: Some(store.clone()),
            connections: SubscriptionSet::new(),
        }
    }

    /// See [`Store::observe`]. Does nothing after [`clear`](StateObserver::clear).
    pub fn observe<T, P, H>(&mut self, projection: P, handler: H)
    where
        T: PartialEq + Clone + Send + 'static,
        P: Fn(&State) -> T + Send + Sync + 'static,
        H: Fn(&T) + Send + Sync + 'static,
    {
        if let Some(store) = &self.store {
            self.connections += store.observe(projection, handler);
        }
    }

    /// See [`Store::observe_with`]. Does nothing after
    /// [`clear`](StateObserver::clear).
    pub fn observe_with<T, P, E, H>(&mut self, projection: P, same: E, handler: H)
    where
        T: Clone + Send + 'static,
        P: Fn(&State) -> T + Send + Sync + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
        H: Fn(&T) + Send + Sync + 'static,
    {
        if let Some(store) = &self.store {
            self.connections += store.observe_with(projection, same, handler);
        }
    }

    pub fn store(&self) -> Option<&Store<State, Action>> {
        self.store.as_ref()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Forget every observation and let go of the store.
    pub fn clear(&mut self) {
        self.connections.clear();
        self.store = None;
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct State {
        counter: i32,
        label: String,
    }

    #[derive(Debug)]
    enum Action {
        Add(i32),
        Label(&'static str),
    }

    fn reducer(state: &State, action: Action) -> State {
        match action {
            Action::Add(by) => State {
                counter: state.counter + by,
                ..state.clone()
            },
            Action::Label(label) => State {
                label: label.to_owned(),
                ..state.clone()
            },
        }
    }

    #[test]
    fn test_observes_initial_and_changes() {
        let store = Store::new(State::default(), reducer);
        store.dispatch(Action::Add(42));
        let counters = Arc::new(Mutex::new(Vec::new()));
        let sink = counters.clone();

        let mut observer = StateObserver::new(&store);
        observer.observe(|state: &State| state.counter, move |counter: &i32| sink.lock().push(*counter));
        assert_eq!(*counters.lock(), vec![42]);

        store.dispatch(Action::Add(3));
        store.dispatch(Action::Label("ignored by projection"));
        store.dispatch(Action::Add(5));

        assert_eq!(*counters.lock(), vec![42, 45, 50]);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let store = Store::new(State::default(), reducer);
        let labels = Arc::new(Mutex::new(Vec::new()));
        let sink = labels.clone();

        let mut observer = StateObserver::new(&store);
        observer.observe(
            |state: &State| state.label.clone(),
            move |label: &String| sink.lock().push(label.clone()),
        );
        observer.observe_with(|state: &State| state.counter, |_: &i32, _: &i32| true, |_: &i32| {});
        assert_eq!(observer.len(), 2);
        assert_eq!(store.subscriber_count(), 2);

        observer.clear();
        store.dispatch(Action::Label("late"));
        observer.observe(|state: &State| state.counter, |_: &i32| {});

        assert!(observer.is_empty());
        assert!(observer.store().is_none());
        assert_eq!(store.subscriber_count(), 0);
        assert_eq!(*labels.lock(), vec![String::new()]);
    }

    #[test]
    fn test_drop_forgets_everything() {
        let store = Store::new(State::default(), reducer);
        {
            let mut observer = StateObserver::new(&store);
            observer.observe(|state: &State| state.counter, |_: &i32| {});
            assert_eq!(store.subscriber_count(), 1);
        }
        assert_eq!(store.subscriber_count(), 0);
    }
}
