//! Unidirectional state store.
//!
//! State lives in a [`Store`] and only changes by dispatching actions, which a
//! pure [`Reducer`] turns into the next state. Subscribers are told about
//! every change, in the order they subscribed, before `dispatch` returns.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//! use ushiro::Store;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Counter {
//!     count: i32,
//! }
//!
//! #[derive(Debug)]
//! enum Action {
//!     Increment,
//!     Decrement,
//! }
//!
//! fn reduce(state: &Counter, action: Action) -> Counter {
//!     match action {
//!         Action::Increment => Counter { count: state.count + 1 },
//!         Action::Decrement => Counter { count: state.count - 1 },
//!     }
//! }
//!
//! let store = Store::new(Counter::default(), reduce);
//! let seen = Arc::new(AtomicI32::new(0));
//!
//! let weak = store.downgrade();
//! let sink = seen.clone();
//! let _subscription = store.subscribe_owned(move || {
//!     if let Some(store) = weak.upgrade() {
//!         sink.store(store.get_state().count, Ordering::SeqCst);
//!     }
//! });
//!
//! store.dispatch(Action::Increment);
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//!
//! store.dispatch(Action::Decrement);
//! store.dispatch(Action::Decrement);
//! assert_eq!(store.get_state().count, -1);
//! ```

mod action_mapper;
mod action_sender;
mod change_observer;
mod config;
mod engine;
mod error;
mod event_bus;
mod reducer;
mod registry;
mod state_mapper;
mod state_observer;
mod state_provider;
mod store;
mod subscription;

pub use action_mapper::ActionMapper;
pub use action_sender::{ActionSender, AnyActionSender};
pub use change_observer::StateWatch;
pub use config::StoreConfig;
pub use error::StoreError;
pub use event_bus::EventBus;
pub use reducer::Reducer;
pub use state_mapper::StateMapper;
pub use state_observer::StateObserver;
pub use state_provider::{AnyStateProvider, StateProvider};
pub use store::{Store, WeakStore};
pub use subscription::{Subscription, SubscriptionId, SubscriptionSet};
