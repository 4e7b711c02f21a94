//! Event names and listener identity.

use crate::props::Props;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// The fixed set of lifecycle event names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Initialize,
    Update,
    Dispose,
}

impl EventKind {
    /// The wire name of this event.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Initialize => "initialize",
            EventKind::Update => "update",
            EventKind::Dispose => "dispose",
        }
    }

    /// Parse a known event name. Returns `None` for names outside the set.
    pub fn from_name(name: &str) -> Option<EventKind> {
        match name {
            "initialize" => Some(EventKind::Initialize),
            "update" => Some(EventKind::Update),
            "dispose" => Some(EventKind::Dispose),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unique identifier for a registered listener.
///
/// Ids are assigned monotonically, so registration order is recoverable
/// from id order within one registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A registered event listener.
///
/// Listeners receive `Some(props)` for `initialize`/`update` and `None` for
/// `dispose`. Stored behind a shared mutex so the registry can snapshot the
/// listener list and release its own lock before invoking anything.
pub type EventCallback = Arc<Mutex<dyn FnMut(Option<&Arc<Props>>) + Send>>;
