/// Pure state transition.
///
/// Given the same state and action a reducer must always return an equal
/// state, and it must not touch the store it is installed in. There is no
/// failure path: an action that makes no sense in the current state should
/// produce an unchanged (or explicitly "rejected") state.
///
/// Any `Fn(&State, Action) -> State` is a reducer.
pub trait Reducer<State, Action> {
    fn reduce(&self, state: &State, action: Action) -> State;
}

impl<State, Action, F> Reducer<State, Action> for F
where
    F: Fn(&State, Action) -> State,
{
    fn reduce(&self, state: &State, action: Action) -> State {
        self(state, action)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct State {
        items: Vec<u32>,
    }

    enum Action {
        Push(u32),
        Ignored,
    }

    struct Feature;

    impl Reducer<State, Action> for Feature {
        fn reduce(&self, state: &State, action: Action) -> State {
            match action {
                Action::Push(value) => {
                    let mut next = state.clone();
                    next.items.push(value);
                    next
                }
                Action::Ignored => state.clone(),
            }
        }
    }

    #[test]
    fn test_reduce_is_deterministic() {
        let state = State { items: vec![1] };

        let first = Feature.reduce(&state, Action::Push(2));
        let second = Feature.reduce(&state, Action::Push(2));

        assert_eq!(first, second);
        assert_eq!(state.items, vec![1]);
        assert_eq!(Feature.reduce(&state, Action::Ignored), state);
    }

    #[test]
    fn test_closure_is_reducer() {
        let reducer = |count: &i32, by: i32| count + by;
        assert_eq!(reducer.reduce(&40, 2), 42);
    }
}
