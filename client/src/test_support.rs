//! Test utilities for the client crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! when the `test-support` feature is enabled.
//!
//! The scripted providers never deliver anything on their own. Tests decide
//! when each listener fires, and may fire listeners whose subscription has
//! already been cancelled to reproduce deliveries the backend had scheduled
//! before the cancellation landed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::domain::ports::{
    AuthListener, AuthStream, ProfileListener, ProfileSnapshot, ProfileStore, ProfileStoreError,
};
use crate::domain::{CancelHandle, Identity, SessionView, UserId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build an identity for `id`.
///
/// # Panics
/// Panics when `id` is not a valid user id.
#[expect(clippy::expect_used, reason = "test fixtures use hard-coded ids")]
pub fn identity(id: &str) -> Identity {
    Identity::new(UserId::new(id).expect("valid test user id"))
}

/// Build a profile field mapping with a name, an email and no picture.
pub fn profile_fields(name: &str, email: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("name".to_owned(), Value::String(name.to_owned()));
    fields.insert("email".to_owned(), Value::String(email.to_owned()));
    fields.insert("profilePicUrl".to_owned(), Value::Null);
    fields
}

#[derive(Default)]
struct AuthScript {
    next_id: u64,
    listeners: Vec<(u64, AuthListener)>,
    subscriptions: usize,
}

/// Auth stream whose events are pushed by the test.
#[derive(Clone, Default)]
pub struct ScriptedAuthStream {
    script: Arc<Mutex<AuthScript>>,
}

impl ScriptedAuthStream {
    /// Deliver `identity` to every live listener.
    pub fn emit(&self, identity: Option<Identity>) {
        let listeners: Vec<AuthListener> = lock(&self.script)
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(identity.clone());
        }
    }

    /// Number of listeners that have not been cancelled.
    pub fn active_listeners(&self) -> usize {
        lock(&self.script).listeners.len()
    }

    /// Total number of subscriptions ever made.
    pub fn subscriptions(&self) -> usize {
        lock(&self.script).subscriptions
    }
}

impl AuthStream for ScriptedAuthStream {
    fn subscribe(&self, listener: AuthListener) -> CancelHandle {
        let id = {
            let mut script = lock(&self.script);
            script.next_id += 1;
            script.subscriptions += 1;
            let id = script.next_id;
            script.listeners.push((id, listener));
            id
        };
        let script = Arc::clone(&self.script);
        CancelHandle::new(move || {
            lock(&script).listeners.retain(|(existing, _)| *existing != id);
        })
    }
}

struct WatchRecord {
    user_id: UserId,
    listener: ProfileListener,
    cancelled: bool,
}

/// Profile store whose snapshots are pushed by the test.
///
/// Watches are numbered in the order they were opened, starting at zero.
#[derive(Clone, Default)]
pub struct ScriptedProfileStore {
    watches: Arc<Mutex<Vec<WatchRecord>>>,
}

impl ScriptedProfileStore {
    /// Number of watches ever opened.
    pub fn watch_count(&self) -> usize {
        lock(&self.watches).len()
    }

    /// Number of watches not yet cancelled.
    pub fn active_watch_count(&self) -> usize {
        lock(&self.watches)
            .iter()
            .filter(|record| !record.cancelled)
            .count()
    }

    /// User observed by watch `index`.
    pub fn watched_user(&self, index: usize) -> Option<UserId> {
        lock(&self.watches)
            .get(index)
            .map(|record| record.user_id.clone())
    }

    /// Whether watch `index` has been cancelled.
    pub fn is_cancelled(&self, index: usize) -> bool {
        lock(&self.watches)
            .get(index)
            .is_some_and(|record| record.cancelled)
    }

    /// Fire watch `index`, even if it was cancelled.
    ///
    /// Returns `false` when no such watch exists.
    pub fn deliver(&self, index: usize, result: Result<ProfileSnapshot, ProfileStoreError>) -> bool {
        let listener = lock(&self.watches)
            .get(index)
            .map(|record| Arc::clone(&record.listener));
        match listener {
            Some(listener) => {
                listener(result);
                true
            }
            None => false,
        }
    }

    /// Fire the most recently opened watch, even if it was cancelled.
    pub fn deliver_latest(&self, result: Result<ProfileSnapshot, ProfileStoreError>) -> bool {
        match self.watch_count().checked_sub(1) {
            Some(index) => self.deliver(index, result),
            None => false,
        }
    }
}

impl ProfileStore for ScriptedProfileStore {
    fn watch(&self, user_id: &UserId, listener: ProfileListener) -> CancelHandle {
        let index = {
            let mut watches = lock(&self.watches);
            watches.push(WatchRecord {
                user_id: user_id.clone(),
                listener,
                cancelled: false,
            });
            watches.len() - 1
        };
        let watches = Arc::clone(&self.watches);
        CancelHandle::new(move || {
            if let Some(record) = lock(&watches).get_mut(index) {
                record.cancelled = true;
            }
        })
    }
}

/// Collects every view passed to a session listener.
#[derive(Clone, Default)]
pub struct ViewRecorder {
    views: Arc<Mutex<Vec<SessionView>>>,
}

impl ViewRecorder {
    /// Listener appending to this recorder.
    pub fn listener(&self) -> impl Fn(SessionView) + Send + Sync + 'static {
        let views = Arc::clone(&self.views);
        move |view| lock(&views).push(view)
    }

    /// Copy of the views seen so far.
    pub fn views(&self) -> Vec<SessionView> {
        lock(&self.views).clone()
    }

    /// Most recent view.
    pub fn last(&self) -> Option<SessionView> {
        lock(&self.views).last().cloned()
    }

    /// Number of views seen so far.
    pub fn len(&self) -> usize {
        lock(&self.views).len()
    }

    /// Whether no view has been seen.
    pub fn is_empty(&self) -> bool {
        lock(&self.views).is_empty()
    }
}
