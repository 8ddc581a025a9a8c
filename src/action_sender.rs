use std::ops::Deref;
use std::sync::Arc;

use crate::error::StoreError;

/// Anything actions can be dispatched into: a store, a scoped view of one,
/// or a mapper in front of either.
pub trait ActionSender: Send + Sync {
    type SendableAction;

    /// Dispatch and report problems through the store's error channel.
    fn send(&self, action: Self::SendableAction);

    /// Dispatch and hand problems back to the caller.
    fn try_send(&self, action: Self::SendableAction) -> Result<(), StoreError>;
}

pub struct AnyActionSender<Action: Send + 'static> {
    value: Box<dyn ActionSender<SendableAction = Action>>,
}

impl<Action: Send + 'static> AnyActionSender<Action> {
    pub fn new(value: Box<dyn ActionSender<SendableAction = Action>>) -> Self {
        Self { value }
    }
}

impl<Action: Send + 'static> ActionSender for AnyActionSender<Action> {
    type SendableAction = Action;

    fn send(&self, action: Action) {
        self.value.send(action)
    }

    fn try_send(&self, action: Action) -> Result<(), StoreError> {
        self.value.try_send(action)
    }
}

impl<T> ActionSender for Arc<T>
where
    T: ActionSender + ?Sized,
{
    type SendableAction = T::SendableAction;

    fn send(&self, action: Self::SendableAction) {
        self.deref().send(action);
    }

    fn try_send(&self, action: Self::SendableAction) -> Result<(), StoreError> {
        self.deref().try_send(action)
    }
}
