use std::sync::Arc;

use futures::Stream;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::subscription::Subscription;

/// Async view of a store's state, created by [`Store::watch`](crate::Store::watch).
///
/// Holds a subscription on the store that pushes every new snapshot into a
/// `tokio::sync::watch` channel. Consumers that fall behind only see the
/// latest state. Dropping the watch unsubscribes it.
pub struct StateWatch<State> {
    receiver: watch::Receiver<Arc<State>>,
    _subscription: Subscription,
}

impl<State> StateWatch<State>
where
    State: Send + Sync + 'static,
{
    pub(crate) fn new(receiver: watch::Receiver<Arc<State>>, subscription: Subscription) -> Self {
        Self {
            receiver,
            _subscription: subscription,
        }
    }

    /// Latest snapshot seen by the watch.
    pub fn current(&self) -> Arc<State> {
        self.receiver.borrow().clone()
    }

    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next state change and return the new snapshot.
    ///
    /// Fails with [`StoreError::StoreDropped`] once the store is gone.
    pub async fn changed(&mut self) -> Result<Arc<State>, StoreError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| StoreError::StoreDropped)?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Stream of snapshots, ending when the store is dropped.
    pub fn into_stream(self) -> impl Stream<Item = Arc<State>> + Send {
        futures::stream::unfold(self, |mut watch| async move {
            let state = watch.changed().await.ok()?;
            Some((state, watch))
        })
    }
}
