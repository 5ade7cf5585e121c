//! Ports for the per-user watched movies collection.
//!
//! Entries live at `users/<uid>/watched_movies/<movie id>`. The repository
//! covers point reads and writes from the detail screen; the feed pushes the
//! whole collection to the list screen whenever it changes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{CancelHandle, MovieId, SavedMovie, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by watched movie adapters.
    pub enum WatchedMoviesError {
        /// Repository connection could not be established.
        Connection { message: String } => "watched movies connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "watched movies query failed: {message}",
    }
}

/// Point reads and writes on a user's watched movies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchedMoviesRepository: Send + Sync {
    /// Fetch one saved entry.
    async fn find(
        &self,
        user_id: &UserId,
        movie_id: MovieId,
    ) -> Result<Option<SavedMovie>, WatchedMoviesError>;

    /// Create or replace an entry keyed by its movie id.
    async fn save(&self, user_id: &UserId, movie: &SavedMovie) -> Result<(), WatchedMoviesError>;

    /// Delete an entry; deleting a missing entry succeeds.
    async fn remove(&self, user_id: &UserId, movie_id: MovieId) -> Result<(), WatchedMoviesError>;
}

/// Listener invoked with the full collection or a read failure.
pub type WatchedMoviesListener =
    Arc<dyn Fn(Result<Vec<SavedMovie>, WatchedMoviesError>) + Send + Sync>;

/// Live view over a user's watched movies.
#[cfg_attr(test, mockall::automock)]
pub trait WatchedMoviesFeed: Send + Sync {
    /// Watch the collection of `user_id`; the returned handle stops the watch.
    fn watch(&self, user_id: &UserId, listener: WatchedMoviesListener) -> CancelHandle;
}
