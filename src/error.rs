//! Error types for the observer.

use thiserror::Error;

/// Main error type for observer operations.
///
/// The surface is deliberately small: a malformed store is unrepresentable at
/// the type level, unknown event names are non-fatal diagnostics, and hook
/// panics propagate uncaught to the caller that triggered the transition.
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("store refused subscription: {0}")]
    Subscription(String),
}

/// Result type for observer operations.
pub type Result<T> = std::result::Result<T, ObserverError>;
