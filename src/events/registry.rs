//! Listener registry for named lifecycle events.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::types::{EventCallback, EventKind, ListenerId};
use crate::props::Props;

/// Per-instance listener registry.
///
/// Holds ordered listener lists keyed by event name. All methods take
/// `&self`; the internal lock is never held while a listener runs, so
/// listeners may register or remove listeners from within a callback.
pub struct EventRegistry {
    /// Listener lists by event name, in registration order.
    listeners: Mutex<HashMap<String, Vec<(ListenerId, EventCallback)>>>,
    /// Counter for generating listener IDs.
    next_id: AtomicU64,
}

impl EventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener under an event name.
    ///
    /// Names outside the fixed lifecycle set are accepted (and dispatched by
    /// name if ever emitted) but produce a diagnostic warning.
    pub fn on(
        &self,
        event: &str,
        callback: impl FnMut(Option<&Arc<Props>>) + Send + 'static,
    ) -> ListenerId {
        if EventKind::from_name(event).is_none() {
            tracing::warn!(event, "listener registered for unknown event name");
        }

        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let callback: EventCallback = Arc::new(Mutex::new(callback));

        self.listeners
            .lock()
            .entry(event.to_string())
            .or_default()
            .push((id, callback));

        id
    }

    /// Remove a specific listener. Ignored if the id is not registered
    /// under the given name.
    pub fn off(&self, event: &str, id: ListenerId) {
        let mut listeners = self.listeners.lock();
        if let Some(list) = listeners.get_mut(event) {
            list.retain(|(listener_id, _)| *listener_id != id);
            if list.is_empty() {
                listeners.remove(event);
            }
        }
    }

    /// Invoke all listeners for an event, in registration order.
    ///
    /// The listener list is snapshotted up front: removals during emission
    /// take effect on the next emit, and listeners added during emission do
    /// not see the current one.
    pub fn emit(&self, event: &str, payload: Option<&Arc<Props>>) {
        let snapshot: Vec<EventCallback> = {
            let listeners = self.listeners.lock();
            match listeners.get(event) {
                Some(list) => list.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
                None => return,
            }
        };

        for callback in snapshot {
            (&mut *callback.lock())(payload);
        }
    }

    /// Drop every registered listener.
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }

    /// Number of listeners registered under an event name.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .get(event)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
