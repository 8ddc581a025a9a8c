use std::cell::Cell;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard, RwLock};

use crate::config::StoreConfig;
use crate::error::{ErrorHandler, StoreError};
use crate::reducer::Reducer;
use crate::registry::SubscriberRegistry;
use crate::subscription::SubscriptionId;

/// Owns the state slot, the reducer and the subscriber registry of one root
/// store, and runs the dispatch cycle
/// `Idle -> Reducing -> Swapping -> Notifying -> Idle`.
pub(crate) struct StoreEngine<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    state: RwLock<Arc<State>>,
    reducer: Box<dyn Reducer<State, Action> + Send + Sync + 'static>,
    registry: Arc<SubscriberRegistry>,
    // Serialises dispatches across threads. Reentrant so callbacks running on
    // the dispatching thread can dispatch again. Holds the nesting depth.
    dispatch_lock: ReentrantMutex<Cell<usize>>,
    error_handler: Mutex<Option<ErrorHandler>>,
    config: StoreConfig,
}

impl<State, Action> StoreEngine<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    pub fn new(
        state: State,
        reducer: impl Reducer<State, Action> + Send + Sync + 'static,
        config: StoreConfig,
    ) -> Self {
        log::debug!("[{}] created", config.name);
        Self {
            state: RwLock::new(Arc::new(state)),
            reducer: Box::new(reducer),
            registry: Arc::new(SubscriberRegistry::default()),
            dispatch_lock: ReentrantMutex::new(Cell::new(0)),
            error_handler: Mutex::new(None),
            config,
        }
    }

    pub fn state(&self) -> Arc<State> {
        self.state.read().clone()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        if !self.registry.remove(id) {
            log::trace!("[{}] unsubscribe of unknown {:?} ignored", self.config.name, id);
        }
    }

    pub fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        let depth_cell = self.dispatch_lock.lock();
        let depth = depth_cell.get() + 1;
        if let Some(limit) = self.config.max_dispatch_depth {
            if depth > limit {
                return Err(StoreError::DispatchDepthExceeded { depth, limit });
            }
        }
        let _depth = DepthGuard::enter(&depth_cell);

        log::trace!("[{}] reducing {:?} at depth {}", self.config.name, action, depth);
        let current = self.state();
        let next = self.reducer.reduce(&current, action);

        if self.config.skip_unchanged && next == *current {
            log::debug!("[{}] state unchanged, skipping notification", self.config.name);
            return Ok(());
        }

        *self.state.write() = Arc::new(next);
        drop(current);

        let pass = self.registry.snapshot();
        log::trace!(
            "[{}] notifying {} subscribers at depth {}",
            self.config.name,
            pass.len(),
            depth
        );
        pass.notify_all();
        Ok(())
    }

    /// Dispatch without an error channel: depth guard refusals go to the
    /// error handler, or the log when there is none.
    pub fn send_reporting(&self, action: Action) {
        if let Err(error) = self.dispatch(action) {
            self.report(&error);
        }
    }

    fn report(&self, error: &StoreError) {
        let handler = self.error_handler.lock().clone();
        match handler {
            Some(handler) => handler(error),
            None => log::error!("[{}] {}", self.config.name, error),
        }
    }
}

struct DepthGuard<'a> {
    cell: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(cell: &'a Cell<usize>) -> Self {
        cell.set(cell.get() + 1);
        Self { cell }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.cell.set(self.cell.get() - 1);
    }
}

/// The parts of a root engine that do not depend on its action type, so
/// scoped stores can reach them.
pub(crate) trait EngineControl: Send + Sync {
    fn registry(&self) -> &Arc<SubscriberRegistry>;
    fn set_error_handler(&self, handler: Option<ErrorHandler>);
    /// Nesting depth of dispatches on the calling thread. Zero when another
    /// thread holds the dispatch lock, since this thread is then not inside
    /// a dispatch.
    fn depth(&self) -> usize;
    /// Keeps other threads from dispatching until the guard drops. The
    /// calling thread may still dispatch.
    fn exclusive(&self) -> ReentrantMutexGuard<'_, Cell<usize>>;
    fn name(&self) -> &str;
}

impl<State, Action> EngineControl for StoreEngine<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        *self.error_handler.lock() = handler;
    }

    fn depth(&self) -> usize {
        self.dispatch_lock.try_lock().map_or(0, |depth| depth.get())
    }

    fn exclusive(&self) -> ReentrantMutexGuard<'_, Cell<usize>> {
        self.dispatch_lock.lock()
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

impl<State, Action> Drop for StoreEngine<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let dropped = self.registry.clear();
        log::debug!(
            "[{}] dropped, {} subscriptions invalidated",
            self.config.name,
            dropped
        );
    }
}
