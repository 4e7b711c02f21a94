//! The store contract and a reference in-memory implementation.
//!
//! The observer never owns the state container; it binds to anything
//! satisfying [`Store`]. The contract is deliberately narrow: read the
//! current snapshot, subscribe to change notifications, dispatch actions.

use crate::error::Result;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A no-argument change notification callback.
pub type Listener = Box<dyn Fn() + Send + Sync>;

/// Ownership handle for a store subscription, invoked exactly once to
/// detach the listener.
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

/// An immutable-snapshot state container.
///
/// Contract preconditions the observer relies on (and cannot enforce):
///
/// - Every observable state change produces a new top-level `Arc`;
///   `snapshot()` is reference-stable between transitions. Re-notifying
///   while the snapshot is unchanged is legal and treated as a no-op.
/// - Listeners fire after each committed transition, never before the first
///   transition following subscription. The store may coalesce or skip
///   notifications for its own reasons.
/// - After the [`Unsubscribe`] handle runs, no further deliveries reach the
///   listener. Deliveries that arrive anyway are tolerated best-effort.
/// - Notification delivery is synchronous and driven from a single logical
///   thread at a time.
pub trait Store: Send + Sync + 'static {
    type State: Send + Sync;
    type Action;

    /// Current state snapshot.
    fn snapshot(&self) -> Arc<Self::State>;

    /// Register a change listener. Returns the detach handle, or an error
    /// if the store refuses new subscriptions.
    fn subscribe(&self, listener: Listener) -> Result<Unsubscribe>;

    /// Route an action through the store's own mutation discipline.
    fn dispatch(&self, action: Self::Action);
}

/// Cheap cloneable handle that binds action props to a store's `dispatch`.
pub struct Dispatcher<St: Store> {
    store: Arc<St>,
}

impl<St: Store> Dispatcher<St> {
    pub(crate) fn new(store: Arc<St>) -> Self {
        Self { store }
    }

    /// Dispatch an action to the bound store.
    pub fn dispatch(&self, action: St::Action) {
        self.store.dispatch(action);
    }
}

impl<St: Store> Clone for Dispatcher<St> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Reducer for [`MemoryStore`]: maps the current snapshot and an action to
/// the next snapshot. Returning the same `Arc` signals "no change" and still
/// notifies listeners, exercising the observers' redundant-notification
/// guard.
pub type Reducer<S, A> = Box<dyn Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync>;

/// Minimal reducer-driven store satisfying the [`Store`] contract.
///
/// Used by this crate's tests and benches, and usable downstream as a test
/// double. Listeners are notified synchronously after every dispatch, in
/// subscription order.
pub struct MemoryStore<S, A> {
    /// Current snapshot.
    state: Mutex<Arc<S>>,
    /// State transition function.
    reducer: Reducer<S, A>,
    /// Subscribed listeners (shared with unsubscribe handles).
    listeners: Arc<RwLock<Vec<(u64, Arc<dyn Fn() + Send + Sync>)>>>,
    /// Counter for generating listener IDs.
    next_listener: AtomicU64,
}

impl<S, A> MemoryStore<S, A>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    /// Create a store with an initial state and a reducer.
    pub fn new(
        initial: S,
        reducer: impl Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: Mutex::new(Arc::new(initial)),
            reducer: Box::new(reducer),
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl<S, A> Store for MemoryStore<S, A>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    type State = S;
    type Action = A;

    fn snapshot(&self) -> Arc<S> {
        Arc::clone(&self.state.lock())
    }

    fn subscribe(&self, listener: Listener) -> Result<Unsubscribe> {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        let listener: Arc<dyn Fn() + Send + Sync> = Arc::from(listener);
        self.listeners.write().push((id, listener));

        let listeners = Arc::clone(&self.listeners);
        Ok(Box::new(move || {
            listeners.write().retain(|(lid, _)| *lid != id);
        }))
    }

    fn dispatch(&self, action: A) {
        {
            let mut state = self.state.lock();
            let next = (self.reducer)(&state, &action);
            *state = next;
        }

        // Listener list is snapshotted so a listener may unsubscribe (or a
        // hook may dispose its observer) during delivery.
        let snapshot: Vec<Arc<dyn Fn() + Send + Sync>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::trace!(listeners = snapshot.len(), "store transition committed");
        for listener in snapshot {
            (*listener)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, PartialEq)]
    struct Counter {
        count: i64,
    }

    enum CounterAction {
        Increment,
        Noop,
    }

    fn counter_store() -> MemoryStore<Counter, CounterAction> {
        MemoryStore::new(Counter { count: 0 }, |state, action| match action {
            CounterAction::Increment => Arc::new(Counter {
                count: state.count + 1,
            }),
            // Unchanged: hand back the same snapshot.
            CounterAction::Noop => Arc::clone(state),
        })
    }

    #[test]
    fn test_dispatch_replaces_snapshot() {
        let store = counter_store();
        let before = store.snapshot();

        store.dispatch(CounterAction::Increment);
        let after = store.snapshot();

        assert_eq!(after.count, 1);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_noop_action_keeps_snapshot_identity() {
        let store = counter_store();
        let before = store.snapshot();

        store.dispatch(CounterAction::Noop);
        let after = store.snapshot();

        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_listeners_notified_after_every_dispatch() {
        let store = counter_store();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);

        let _unsub = store
            .subscribe(Box::new(move || {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        store.dispatch(CounterAction::Increment);
        // Redundant notification: snapshot unchanged, listener still fires.
        store.dispatch(CounterAction::Noop);

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let store = counter_store();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);

        let unsub = store
            .subscribe(Box::new(move || {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        store.dispatch(CounterAction::Increment);
        unsub();
        store.dispatch(CounterAction::Increment);

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_listeners_fire_in_subscription_order() {
        let store = counter_store();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            let _ = store
                .subscribe(Box::new(move || order.lock().push(tag)))
                .unwrap();
        }

        store.dispatch(CounterAction::Increment);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }
}
