//! In-process backend adapters.
//!
//! Every watcher is notified after the adapter's lock is released, and every
//! new watch receives the current state before `watch` returns.

mod auth;
mod documents;
mod storage;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use auth::InMemoryAuthProvider;
pub use documents::InMemoryDocumentStore;
pub use storage::InMemoryAvatarStorage;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
