//! Driven port for the authentication state stream.
//!
//! The provider pushes the current principal immediately on subscription and
//! again on every sign-in or sign-out. The stream itself is assumed never to
//! fail; reconnection is the provider's concern.

use std::sync::Arc;

use crate::domain::{CancelHandle, Identity};

/// Listener invoked with the signed-in identity, or `None` when signed out.
pub type AuthListener = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// Push stream of authentication state changes.
#[cfg_attr(test, mockall::automock)]
pub trait AuthStream: Send + Sync {
    /// Register `listener`; the returned handle unsubscribes it.
    ///
    /// Implementations fire once with the current state (possibly before
    /// returning) and then on every change.
    fn subscribe(&self, listener: AuthListener) -> CancelHandle;
}
