use std::sync::Arc;

/// Read access to a state snapshot.
pub trait StateProvider: Send + Sync {
    type State;

    fn state(&self) -> Arc<Self::State>;
}

/// Type-erased, cheaply cloneable [`StateProvider`].
pub struct AnyStateProvider<State> {
    value: Arc<dyn StateProvider<State = State>>,
}

impl<State> AnyStateProvider<State> {
    pub fn new(value: Arc<dyn StateProvider<State = State>>) -> Self {
        Self { value }
    }
}

impl<State> Clone for AnyStateProvider<State> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<State> StateProvider for AnyStateProvider<State> {
    type State = State;

    fn state(&self) -> Arc<Self::State> {
        self.value.state()
    }
}
