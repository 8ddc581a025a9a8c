use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::action_mapper::ActionMapper;
use crate::action_sender::{ActionSender, AnyActionSender};
use crate::change_observer::StateWatch;
use crate::config::StoreConfig;
use crate::engine::{EngineControl, StoreEngine};
use crate::error::StoreError;
use crate::reducer::Reducer;
use crate::state_mapper::StateMapper;
use crate::state_provider::{AnyStateProvider, StateProvider};
use crate::subscription::{Detach, Subscription, SubscriptionId};

/// Single source of truth for a piece of application state.
///
/// State only changes through [`dispatch`](Store::dispatch): the reducer turns
/// the current state and an action into the next state, the store publishes
/// it, and every subscriber that was registered when the notification pass
/// began is called, in registration order, before `dispatch` returns.
///
/// `Store` is a handle; clones share the same state. Callbacks that need to
/// dispatch should capture a [`WeakStore`] from [`downgrade`](Store::downgrade),
/// otherwise the store keeps itself alive.
pub struct Store<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    engine: EngineHolder<State, Action>,
}

enum EngineHolder<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    Engine(Arc<StoreEngine<State, Action>>),
    Parent(Arc<ScopedParent<State, Action>>),
}

struct ScopedParent<State, Action>
where
    Action: Send + 'static,
{
    sender: AnyActionSender<Action>,
    state: AnyStateProvider<State>,
    root: Arc<dyn EngineControl>,
}

impl<State, Action> Store<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    pub fn new<R: Reducer<State, Action> + Send + Sync + 'static>(state: State, reducer: R) -> Self {
        Self::with_config(state, reducer, StoreConfig::default())
    }

    pub fn with_config<R: Reducer<State, Action> + Send + Sync + 'static>(
        state: State,
        reducer: R,
        config: StoreConfig,
    ) -> Self {
        Self {
            engine: EngineHolder::Engine(Arc::new(StoreEngine::new(state, reducer, config))),
        }
    }

    /// The current snapshot. Never blocks on a running dispatch.
    pub fn get_state(&self) -> Arc<State> {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.state(),
            EngineHolder::Parent(parent) => parent.state.state(),
        }
    }

    /// Reduce `action` and notify subscribers if the state changed.
    ///
    /// May be called from inside a subscriber callback; the nested dispatch
    /// runs its own notification pass to completion before returning. A
    /// refused dispatch (see [`StoreConfig::max_dispatch_depth`]) is passed
    /// to the error handler, or logged when none is set.
    pub fn dispatch(&self, action: Action) {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.send_reporting(action),
            EngineHolder::Parent(parent) => parent.sender.send(action),
        }
    }

    /// Like [`dispatch`](Store::dispatch), but returns the refusal instead of
    /// reporting it.
    pub fn try_dispatch(&self, action: Action) -> Result<(), StoreError> {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.dispatch(action),
            EngineHolder::Parent(parent) => parent.sender.try_send(action),
        }
    }

    /// Register `callback` for every later state-changing dispatch. It is not
    /// called now.
    ///
    /// Registering during a notification pass takes effect from the next pass.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.root().registry().insert(Arc::new(callback))
    }

    /// Like [`subscribe`](Store::subscribe), unsubscribing when the returned
    /// guard is dropped.
    pub fn subscribe_owned(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.subscribe(callback);
        self.owned(id)
    }

    /// Remove a subscriber. Unknown or already removed ids are ignored.
    ///
    /// A subscriber removed while a pass is running still gets that pass's
    /// notification, but none after it.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.unsubscribe(id),
            EngineHolder::Parent(parent) => {
                parent.root.registry().remove(id);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.root().registry().len()
    }

    /// How many dispatches are nested on the calling thread. Zero outside of
    /// a dispatch, including while another thread is dispatching; this never
    /// waits for that dispatch to finish.
    pub fn dispatch_depth(&self) -> usize {
        self.root().depth()
    }

    /// Name of the root store, as configured.
    pub fn name(&self) -> &str {
        match &self.engine {
            EngineHolder::Engine(engine) => &engine.config().name,
            EngineHolder::Parent(parent) => parent.root.name(),
        }
    }

    /// Install the handler that receives errors from [`dispatch`](Store::dispatch).
    /// Scoped stores share the handler of their root.
    pub fn set_error_handler(&self, handler: impl Fn(&StoreError) + Send + Sync + 'static) {
        self.root().set_error_handler(Some(Arc::new(handler)));
    }

    pub fn clear_error_handler(&self) {
        self.root().set_error_handler(None);
    }

    /// Call `handler` with `projection` of the current state now, and again
    /// after each notification pass in which the projected value changed.
    ///
    /// The observation only holds a weak reference to this handle: on a scoped
    /// store it stops once every clone of the scoped handle is gone.
    pub fn observe<T, P, H>(&self, projection: P, handler: H) -> Subscription
    where
        T: PartialEq + Clone + Send + 'static,
        P: Fn(&State) -> T + Send + Sync + 'static,
        H: Fn(&T) + Send + Sync + 'static,
    {
        self.observe_with(projection, |next: &T, last: &T| next == last, handler)
    }

    /// Like [`observe`](Store::observe), with `same(next, last)` deciding
    /// whether a projected value counts as unchanged.
    pub fn observe_with<T, P, E, H>(&self, projection: P, same: E, handler: H) -> Subscription
    where
        T: Clone + Send + 'static,
        P: Fn(&State) -> T + Send + Sync + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
        H: Fn(&T) + Send + Sync + 'static,
    {
        let root = self.root();
        // No other thread may dispatch between the first read and the insert.
        let _exclusive = root.exclusive();
        let initial = projection(&self.get_state());
        let handler = Arc::new(handler);
        let first = handler.clone();

        let last = Mutex::new(initial.clone());
        let weak = self.downgrade();
        let subscription = self.subscribe_owned(move || {
            let Some(store) = weak.upgrade() else {
                return;
            };
            let next = projection(&store.get_state());
            {
                let mut last = last.lock();
                if same(&next, &*last) {
                    return;
                }
                *last = next.clone();
            }
            // The handler may dispatch, which re-enters this callback.
            handler(&next);
        });
        first(&initial);
        subscription
    }

    /// A child store that reads `state` of this one and dispatches through
    /// `action`. Its subscribers live in the root store and are notified on
    /// every change of the root state.
    pub fn scope<ChildState, ChildAction>(
        &self,
        state: impl Fn(&State) -> ChildState + Send + Sync + 'static,
        action: impl Fn(ChildAction) -> Action + Send + Sync + 'static,
    ) -> Store<ChildState, ChildAction>
    where
        ChildState: PartialEq + Send + Sync + 'static,
        ChildAction: std::fmt::Debug + Send + 'static,
    {
        let parent: Box<dyn ActionSender<SendableAction = Action>> = Box::new(self.clone());
        let mapper = ActionMapper::new(parent, action);
        let sender: AnyActionSender<ChildAction> = AnyActionSender::new(Box::new(mapper));

        let parent_state: AnyStateProvider<State> = AnyStateProvider::new(Arc::new(self.clone()));
        let state: AnyStateProvider<ChildState> =
            AnyStateProvider::new(Arc::new(StateMapper::new(parent_state, state)));

        Store {
            engine: EngineHolder::Parent(Arc::new(ScopedParent {
                sender,
                state,
                root: self.root(),
            })),
        }
    }

    pub fn downgrade(&self) -> WeakStore<State, Action> {
        let engine = match &self.engine {
            EngineHolder::Engine(engine) => WeakHolder::Engine(Arc::downgrade(engine)),
            EngineHolder::Parent(parent) => WeakHolder::Parent(Arc::downgrade(parent)),
        };
        WeakStore { engine }
    }

    /// Async view of the state, updated after each state change.
    pub fn watch(&self) -> StateWatch<State> {
        let (sender, receiver) = tokio::sync::watch::channel(self.get_state());
        let weak = self.downgrade();
        let subscription = self.subscribe_owned(move || {
            if let Some(store) = weak.upgrade() {
                sender.send_replace(store.get_state());
            }
        });
        StateWatch::new(receiver, subscription)
    }

    fn root(&self) -> Arc<dyn EngineControl> {
        match &self.engine {
            EngineHolder::Engine(engine) => {
                let root: Arc<dyn EngineControl> = engine.clone();
                root
            }
            EngineHolder::Parent(parent) => parent.root.clone(),
        }
    }

    fn owned(&self, id: SubscriptionId) -> Subscription {
        let registry = Arc::downgrade(self.root().registry());
        let source: Weak<dyn Detach> = registry;
        Subscription::new(source, id)
    }
}

impl<State, Action> Clone for Store<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        let engine = match &self.engine {
            EngineHolder::Engine(engine) => EngineHolder::Engine(engine.clone()),
            EngineHolder::Parent(parent) => EngineHolder::Parent(parent.clone()),
        };
        Self { engine }
    }
}

impl<State, Action> ActionSender for Store<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    type SendableAction = Action;

    fn send(&self, action: Action) {
        self.dispatch(action);
    }

    fn try_send(&self, action: Action) -> Result<(), StoreError> {
        self.try_dispatch(action)
    }
}

impl<State, Action> StateProvider for Store<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    type State = State;

    fn state(&self) -> Arc<State> {
        self.get_state()
    }
}

impl<State, Action> std::fmt::Debug for Store<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: std::fmt::Debug + PartialEq + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name())
            .field("state", &self.get_state())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Non-owning [`Store`] handle.
pub struct WeakStore<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    engine: WeakHolder<State, Action>,
}

enum WeakHolder<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    Engine(Weak<StoreEngine<State, Action>>),
    Parent(Weak<ScopedParent<State, Action>>),
}

impl<State, Action> WeakStore<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    pub fn upgrade(&self) -> Option<Store<State, Action>> {
        let engine = match &self.engine {
            WeakHolder::Engine(engine) => EngineHolder::Engine(engine.upgrade()?),
            WeakHolder::Parent(parent) => EngineHolder::Parent(parent.upgrade()?),
        };
        Some(Store { engine })
    }
}

impl<State, Action> Clone for WeakStore<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        let engine = match &self.engine {
            WeakHolder::Engine(engine) => WeakHolder::Engine(engine.clone()),
            WeakHolder::Parent(parent) => WeakHolder::Parent(parent.clone()),
        };
        Self { engine }
    }
}

impl<State, Action> ActionSender for WeakStore<State, Action>
where
    Action: std::fmt::Debug + Send + 'static,
    State: PartialEq + Send + Sync + 'static,
{
    type SendableAction = Action;

    fn send(&self, action: Action) {
        match self.upgrade() {
            Some(store) => store.dispatch(action),
            None => log::warn!("dropping {:?}, store is gone", action),
        }
    }

    fn try_send(&self, action: Action) -> Result<(), StoreError> {
        self.upgrade()
            .ok_or(StoreError::StoreDropped)?
            .try_dispatch(action)
    }
}
