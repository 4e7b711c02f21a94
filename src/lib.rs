//! # Vigil
//!
//! A lifecycle observer for immutable-snapshot state containers.
//!
//! ## Core Concepts
//!
//! - **Store**: an external state container exposing snapshot reads,
//!   change subscriptions, and action dispatch
//! - **Props**: string-keyed values projected from state and from the
//!   dispatcher, merged with dispatch keys winning
//! - **Shallow diffing**: one-level equality that decides whether a
//!   transition is meaningful
//! - **Lifecycle**: `initialize → update* → dispose`, with user hooks
//!   running before the matching named event
//!
//! ## Example
//!
//! ```ignore
//! use vigil::{MemoryStore, ObserverConfig, Props, PropValue, StateObserver};
//!
//! let store = Arc::new(MemoryStore::new(Counter { count: 0 }, reducer));
//!
//! let observer = StateObserver::bind(
//!     Arc::clone(&store),
//!     ObserverConfig::new()
//!         .with_map_state(|state: &Counter| Props::new().with("count", state.count))
//!         .with_map_dispatch(|dispatcher| {
//!             let dispatcher = dispatcher.clone();
//!             Props::new().with(
//!                 "increment",
//!                 PropValue::action(move || dispatcher.dispatch(CounterAction::Increment)),
//!             )
//!         })
//!         .with_on_update(|prev, next| println!("{:?} -> {:?}", prev, next)),
//! )?;
//!
//! store.dispatch(CounterAction::Increment);
//! observer.dispose();
//! ```

pub mod diff;
pub mod error;
pub mod events;
pub mod observer;
pub mod props;
pub mod store;

// Re-exports
pub use diff::shallow_eq;
pub use error::{ObserverError, Result};
pub use events::{EventKind, EventRegistry, ListenerId};
pub use observer::{ObserverConfig, StateObserver};
pub use props::{ActionFn, PropValue, Props};
pub use store::{Dispatcher, Listener, MemoryStore, Reducer, Store, Unsubscribe};
