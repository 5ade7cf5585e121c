//! Cancellation tokens for push subscriptions.
//!
//! Every listener registration with a provider hands back a [`CancelHandle`].
//! Cancelling is idempotent and dropping the handle cancels it, so a handle
//! stored in an `Option` is released simply by replacing or taking it.

use std::fmt;

type CancelFn = Box<dyn FnOnce() + Send>;

/// Idempotent token that permanently terminates one subscription.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use client::domain::CancelHandle;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let mut handle = CancelHandle::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// handle.cancel();
/// handle.cancel();
/// drop(handle);
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
#[must_use = "dropping a CancelHandle cancels the subscription immediately"]
pub struct CancelHandle {
    cancel: Option<CancelFn>,
}

impl CancelHandle {
    /// Wrap the provider's unsubscribe function.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle with nothing to release.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Release the subscription. Later calls do nothing.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Whether the subscription is still live.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("active", &self.is_active())
            .finish()
    }
}
