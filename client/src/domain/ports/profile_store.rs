//! Driven port for live profile documents.
//!
//! The document store pushes a full snapshot of `users/<uid>` whenever the
//! document changes, including when it is created or deleted. Read failures
//! (permission, connectivity) are delivered to the same listener.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::{CancelHandle, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors pushed by profile document watches.
    pub enum ProfileStoreError {
        /// The backend refused to read the document.
        PermissionDenied { message: String } => "profile read denied: {message}",
        /// The backend could not be reached.
        Unavailable { message: String } => "profile store unavailable: {message}",
    }
}

/// Full-document snapshot of a profile.
///
/// # Examples
/// ```
/// use client::domain::ports::ProfileSnapshot;
///
/// assert!(!ProfileSnapshot::missing().exists());
/// assert!(ProfileSnapshot::missing().fields().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    fields: Option<Map<String, Value>>,
}

impl ProfileSnapshot {
    /// Snapshot of a document that exists with the given fields.
    pub fn existing(fields: Map<String, Value>) -> Self {
        Self {
            fields: Some(fields),
        }
    }

    /// Snapshot confirming the document does not exist.
    pub fn missing() -> Self {
        Self { fields: None }
    }

    /// Whether the document exists.
    pub fn exists(&self) -> bool {
        self.fields.is_some()
    }

    /// Document fields when the document exists.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.fields.as_ref()
    }
}

/// Listener invoked with each snapshot or read failure.
pub type ProfileListener = Arc<dyn Fn(Result<ProfileSnapshot, ProfileStoreError>) + Send + Sync>;

/// Live view over profile documents keyed by user id.
#[cfg_attr(test, mockall::automock)]
pub trait ProfileStore: Send + Sync {
    /// Watch the profile of `user_id`; the returned handle stops the watch.
    ///
    /// Implementations may deliver the first snapshot before returning.
    fn watch(&self, user_id: &UserId, listener: ProfileListener) -> CancelHandle;
}
