//! Observer instances: store binding and lifecycle sequencing.
//!
//! A [`StateObserver`] binds to a [`Store`] at construction, projects a
//! props mapping from every meaningful state transition, and drives the
//! `initialize → update* → dispose` lifecycle. User hooks run strictly
//! before the matching named event is emitted.

use crate::diff::shallow_eq;
use crate::error::Result;
use crate::events::{EventKind, EventRegistry, ListenerId};
use crate::props::Props;
use crate::store::{Dispatcher, Store, Unsubscribe};
use parking_lot::Mutex;
use std::sync::Arc;

type MapStateFn<S> = Box<dyn Fn(&S) -> Props + Send + Sync>;
type MapDispatchFn<St> = Box<dyn FnOnce(&Dispatcher<St>) -> Props + Send>;
type InitializeHook = Box<dyn FnMut(&Arc<Props>) + Send>;
type UpdateHook = Box<dyn FnMut(&Arc<Props>, &Arc<Props>) + Send>;
type DisposeHook = Box<dyn FnMut() + Send>;

/// Hook configuration for an observer.
///
/// Every field is optional: projectors default to an empty mapping,
/// lifecycle hooks to a no-op. `map_state` must be pure in its argument;
/// the observer relies on that for correct diffing but does not check it.
pub struct ObserverConfig<St: Store> {
    map_state: Option<MapStateFn<St::State>>,
    map_dispatch: Option<MapDispatchFn<St>>,
    on_initialize: Option<InitializeHook>,
    on_update: Option<UpdateHook>,
    on_dispose: Option<DisposeHook>,
}

impl<St: Store> ObserverConfig<St> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project state-derived props. Re-invoked on every changed snapshot.
    pub fn with_map_state(
        mut self,
        project: impl Fn(&St::State) -> Props + Send + Sync + 'static,
    ) -> Self {
        self.map_state = Some(Box::new(project));
        self
    }

    /// Project dispatch-bound props. Invoked exactly once, at construction.
    pub fn with_map_dispatch(
        mut self,
        project: impl FnOnce(&Dispatcher<St>) -> Props + Send + 'static,
    ) -> Self {
        self.map_dispatch = Some(Box::new(project));
        self
    }

    /// Runs once when the observer becomes active, before the `initialize`
    /// event. Receives the initial merged props.
    pub fn with_on_initialize(mut self, hook: impl FnMut(&Arc<Props>) + Send + 'static) -> Self {
        self.on_initialize = Some(Box::new(hook));
        self
    }

    /// Runs on every meaningful update, before the `update` event.
    /// Receives the previous and the new merged props.
    pub fn with_on_update(
        mut self,
        hook: impl FnMut(&Arc<Props>, &Arc<Props>) + Send + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    /// Runs once at disposal, before the subscription detaches and before
    /// the `dispose` event.
    pub fn with_on_dispose(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_dispose = Some(Box::new(hook));
        self
    }
}

impl<St: Store> Default for ObserverConfig<St> {
    fn default() -> Self {
        Self {
            map_state: None,
            map_dispatch: None,
            on_initialize: None,
            on_update: None,
            on_dispose: None,
        }
    }
}

/// Lifecycle stage of an observer. `Disposed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LifecycleStage {
    Uninitialized,
    Active,
    Disposed,
}

/// Mutable binding state, shared with the store listener.
struct BindingCell<S> {
    stage: LifecycleStage,
    /// Last observed snapshot, compared by reference.
    current_state: Arc<S>,
    /// Last meaningful state projection.
    state_props: Props,
    /// Projected once at construction, never recomputed.
    dispatch_props: Props,
    /// Merged props. Replaced wholesale on meaningful change, never mutated.
    props: Arc<Props>,
    /// Detach handle, invoked exactly once at disposal.
    unsubscribe: Option<Unsubscribe>,
}

/// Hook slots. A slot is taken out for the duration of its call, so a
/// re-entrant cycle skips the hook instead of deadlocking on the lock.
struct LifecycleHooks {
    on_initialize: Option<InitializeHook>,
    on_update: Option<UpdateHook>,
    on_dispose: Option<DisposeHook>,
}

struct Shared<S> {
    map_state: Option<MapStateFn<S>>,
    cell: Mutex<BindingCell<S>>,
    hooks: Mutex<LifecycleHooks>,
    events: EventRegistry,
}

/// A lifecycle observer bound to a store.
///
/// Created with [`StateObserver::bind`]; torn down only by an explicit
/// [`dispose`](StateObserver::dispose) call. Dropping the observer without
/// disposing leaves the subscription registered, but the store-side listener
/// holds only weak references and degrades to a no-op once the observer's
/// shared state is gone.
pub struct StateObserver<St: Store> {
    store: Arc<St>,
    shared: Arc<Shared<St::State>>,
}

impl<St: Store> StateObserver<St> {
    /// Bind an observer to a store.
    ///
    /// Reads one snapshot, projects dispatch props (once) and initial state
    /// props, registers the store listener, then transitions to the active
    /// stage: the `on_initialize` hook runs first, the `initialize` event
    /// follows with the same props.
    pub fn bind(store: Arc<St>, config: ObserverConfig<St>) -> Result<Self> {
        let ObserverConfig {
            map_state,
            map_dispatch,
            on_initialize,
            on_update,
            on_dispose,
        } = config;

        let current_state = store.snapshot();

        let dispatcher = Dispatcher::new(Arc::clone(&store));
        let dispatch_props = map_dispatch
            .map(|project| project(&dispatcher))
            .unwrap_or_default();
        let state_props = map_state
            .as_ref()
            .map(|project| project(&current_state))
            .unwrap_or_default();
        let props = Arc::new(state_props.merged(&dispatch_props));

        let shared = Arc::new(Shared {
            map_state,
            cell: Mutex::new(BindingCell {
                stage: LifecycleStage::Uninitialized,
                current_state,
                state_props,
                dispatch_props,
                props,
                unsubscribe: None,
            }),
            hooks: Mutex::new(LifecycleHooks {
                on_initialize,
                on_update,
                on_dispose,
            }),
            events: EventRegistry::new(),
        });

        let weak_shared = Arc::downgrade(&shared);
        let weak_store = Arc::downgrade(&store);
        let unsubscribe = store.subscribe(Box::new(move || {
            let (Some(shared), Some(store)) = (weak_shared.upgrade(), weak_store.upgrade()) else {
                return;
            };
            handle_notification(&*store, &shared);
        }))?;

        let initial_props = {
            let mut cell = shared.cell.lock();
            cell.unsubscribe = Some(unsubscribe);
            cell.stage = LifecycleStage::Active;
            Arc::clone(&cell.props)
        };

        tracing::debug!("observer bound, entering active stage");
        run_initialize_hook(&shared, &initial_props);
        shared
            .events
            .emit(EventKind::Initialize.as_str(), Some(&initial_props));

        Ok(Self { store, shared })
    }

    /// Current merged props.
    pub fn props(&self) -> Arc<Props> {
        Arc::clone(&self.shared.cell.lock().props)
    }

    /// The bound store.
    pub fn store(&self) -> &Arc<St> {
        &self.store
    }

    /// Whether `dispose` has completed (or is in progress).
    pub fn is_disposed(&self) -> bool {
        self.shared.cell.lock().stage == LifecycleStage::Disposed
    }

    /// Register an event listener. See [`EventRegistry::on`].
    pub fn on(
        &self,
        event: &str,
        callback: impl FnMut(Option<&Arc<Props>>) + Send + 'static,
    ) -> ListenerId {
        self.shared.events.on(event, callback)
    }

    /// Remove an event listener. See [`EventRegistry::off`].
    pub fn off(&self, event: &str, id: ListenerId) {
        self.shared.events.off(event, id);
    }

    /// Tear the observer down: `on_dispose` hook, then subscription detach,
    /// then the `dispose` event, then the listener registry is cleared.
    ///
    /// Idempotent: the stage flips at entry, so a second call (including a
    /// re-entrant one from the dispose hook itself) is a no-op.
    pub fn dispose(&self) {
        {
            let mut cell = self.shared.cell.lock();
            if cell.stage == LifecycleStage::Disposed {
                tracing::debug!("dispose called on disposed observer, ignoring");
                return;
            }
            cell.stage = LifecycleStage::Disposed;
        }

        let hook = self.shared.hooks.lock().on_dispose.take();
        if let Some(mut hook) = hook {
            hook();
        }

        let unsubscribe = self.shared.cell.lock().unsubscribe.take();
        if let Some(unsubscribe) = unsubscribe {
            unsubscribe();
        }

        self.shared.events.emit(EventKind::Dispose.as_str(), None);
        self.shared.events.clear();

        // Remaining hook slots can never run again; drop their captures.
        let mut hooks = self.shared.hooks.lock();
        hooks.on_initialize = None;
        hooks.on_update = None;
        drop(hooks);

        tracing::debug!("observer disposed");
    }
}

/// Store notification path: skip redundant notifications, re-project,
/// diff, and run the update cycle on meaningful change.
fn handle_notification<St: Store>(store: &St, shared: &Shared<St::State>) {
    let next_state = store.snapshot();

    let mut cell = shared.cell.lock();
    if cell.stage != LifecycleStage::Active {
        tracing::trace!("notification outside active stage, ignoring");
        return;
    }

    // Same snapshot reference: redundant notification, skip projection.
    if Arc::ptr_eq(&next_state, &cell.current_state) {
        tracing::trace!("snapshot reference unchanged, skipping");
        return;
    }
    cell.current_state = Arc::clone(&next_state);

    let next_state_props = match shared.map_state.as_ref() {
        Some(project) => project(&next_state),
        None => Props::new(),
    };

    if shallow_eq(&cell.state_props, &next_state_props) {
        tracing::trace!("projection shallow-equal, keeping props identity");
        return;
    }

    let next_props = Arc::new(next_state_props.merged(&cell.dispatch_props));
    cell.state_props = next_state_props;
    let prev_props = std::mem::replace(&mut cell.props, Arc::clone(&next_props));
    drop(cell);

    run_update_hook(shared, &prev_props, &next_props);
    shared
        .events
        .emit(EventKind::Update.as_str(), Some(&next_props));
}

fn run_initialize_hook<S>(shared: &Shared<S>, props: &Arc<Props>) {
    let hook = shared.hooks.lock().on_initialize.take();
    if let Some(mut hook) = hook {
        hook(props);
        shared.hooks.lock().on_initialize = Some(hook);
    }
}

fn run_update_hook<S>(shared: &Shared<S>, prev: &Arc<Props>, next: &Arc<Props>) {
    // Slot is empty while the hook runs; a re-entrant update cycle skips it.
    let hook = shared.hooks.lock().on_update.take();
    if let Some(mut hook) = hook {
        hook(prev, next);
        shared.hooks.lock().on_update = Some(hook);
    }
}
