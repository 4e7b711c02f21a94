//! Named lifecycle events for observer instances.
//!
//! Each observer owns an independent registry of listener lists keyed by
//! event name. The known names are `initialize`, `update`, and `dispose`;
//! other names are accepted with a diagnostic warning and dispatched by name
//! if ever emitted.
//!
//! Listeners fire synchronously, in registration order, with the payload for
//! the event (`Some(props)` for `initialize`/`update`, `None` for `dispose`).
//! No isolation between listeners: a panicking listener propagates to the
//! emitter.
//!
//! # Example
//!
//! ```ignore
//! let registry = EventRegistry::new();
//!
//! let id = registry.on("update", |props| {
//!     println!("new props: {:?}", props);
//! });
//!
//! registry.emit("update", Some(&props));
//! registry.off("update", id);
//! ```

mod registry;
mod types;

pub use registry::EventRegistry;
pub use types::{EventCallback, EventKind, ListenerId};
