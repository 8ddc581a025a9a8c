use std::sync::Arc;

use crate::state_provider::{AnyStateProvider, StateProvider};

/// Projects a parent state into a child state on every read.
pub struct StateMapper<State, MappedState, F>
where
    F: Fn(&State) -> MappedState + Send + Sync + 'static,
{
    parent: AnyStateProvider<State>,
    map: F,
    _phantom: std::marker::PhantomData<fn() -> MappedState>,
}

impl<State, MappedState, F> StateMapper<State, MappedState, F>
where
    F: Fn(&State) -> MappedState + Send + Sync + 'static,
{
    pub fn new(parent: AnyStateProvider<State>, map: F) -> Self {
        Self {
            parent,
            map,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<State, MappedState, F> StateProvider for StateMapper<State, MappedState, F>
where
    State: 'static,
    MappedState: 'static,
    F: Fn(&State) -> MappedState + Send + Sync + 'static,
{
    type State = MappedState;

    fn state(&self) -> Arc<Self::State> {
        let parent = self.parent.state();
        Arc::new((self.map)(&parent))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Fixed(Arc<(u32, &'static str)>);

    impl StateProvider for Fixed {
        type State = (u32, &'static str);

        fn state(&self) -> Arc<Self::State> {
            self.0.clone()
        }
    }

    #[test]
    fn test_projects_parent_state() {
        let parent: AnyStateProvider<(u32, &'static str)> =
            AnyStateProvider::new(Arc::new(Fixed(Arc::new((7, "seven")))));
        let number = StateMapper::new(parent.clone(), |state: &(u32, &'static str)| state.0);
        let label = StateMapper::new(parent, |state: &(u32, &'static str)| state.1.to_owned());

        assert_eq!(*number.state(), 7);
        assert_eq!(label.state().as_str(), "seven");
    }
}
