use crate::action_sender::ActionSender;
use crate::error::StoreError;

/// Turns child actions into parent actions before forwarding them.
pub struct ActionMapper<Action, MappedAction, F>
where
    Action: Send,
    MappedAction: Send,
    F: Fn(Action) -> MappedAction + Send + Sync + 'static,
{
    parent: Box<dyn ActionSender<SendableAction = MappedAction>>,
    map: F,
    _phantom: std::marker::PhantomData<fn(Action)>,
}

impl<Action, MappedAction, F> ActionMapper<Action, MappedAction, F>
where
    Action: Send,
    MappedAction: Send,
    F: Fn(Action) -> MappedAction + Send + Sync + 'static,
{
    pub fn new(parent: Box<dyn ActionSender<SendableAction = MappedAction>>, map: F) -> Self {
        Self {
            parent,
            map,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<Action, MappedAction, F> ActionSender for ActionMapper<Action, MappedAction, F>
where
    Action: Send + 'static,
    MappedAction: Send + 'static,
    F: Fn(Action) -> MappedAction + Send + Sync + 'static,
{
    type SendableAction = Action;

    fn send(&self, action: Action) {
        let mapped = (self.map)(action);
        self.parent.send(mapped);
    }

    fn try_send(&self, action: Action) -> Result<(), StoreError> {
        let mapped = (self.map)(action);
        self.parent.try_send(mapped)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum ParentAction {
        Child(u8),
    }

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<ParentAction>>,
    }

    impl ActionSender for Collect {
        type SendableAction = ParentAction;

        fn send(&self, action: ParentAction) {
            self.seen.lock().push(action);
        }

        fn try_send(&self, action: ParentAction) -> Result<(), StoreError> {
            self.send(action);
            Ok(())
        }
    }

    #[test]
    fn test_maps_before_forwarding() -> anyhow::Result<()> {
        let parent = Arc::new(Collect::default());
        let sender: Box<dyn ActionSender<SendableAction = ParentAction>> = Box::new(parent.clone());
        let mapper = ActionMapper::new(sender, ParentAction::Child);

        mapper.send(1);
        mapper.try_send(2)?;

        assert_eq!(
            *parent.seen.lock(),
            vec![ParentAction::Child(1), ParentAction::Child(2)]
        );
        Ok(())
    }
}
