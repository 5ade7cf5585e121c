//! Watched movies: per-movie status, rating toggles and the live list.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    WatchedMoviesError, WatchedMoviesFeed, WatchedMoviesListener, WatchedMoviesRepository,
};
use crate::domain::{
    CancelHandle, Error, Movie, MovieId, Rating, SavedMovie, SavedMovieStatus, UserId,
};

use super::dispatch::SerialDispatcher;

/// Point operations behind the movie detail screen.
#[derive(Clone)]
pub struct WatchlistService<R> {
    movies: Arc<R>,
}

impl<R> WatchlistService<R> {
    /// Create a service over the given repository.
    pub fn new(movies: Arc<R>) -> Self {
        Self { movies }
    }
}

impl<R> WatchlistService<R>
where
    R: WatchedMoviesRepository,
{
    fn map_error(error: WatchedMoviesError) -> Error {
        match error {
            WatchedMoviesError::Connection { message } => {
                Error::service_unavailable(format!("watched movies unavailable: {message}"))
            }
            WatchedMoviesError::Query { message } => {
                Error::internal(format!("watched movies error: {message}"))
            }
        }
    }

    /// Whether `movie_id` is on the list; read failures count as not saved.
    pub async fn status(&self, user_id: &UserId, movie_id: MovieId) -> SavedMovieStatus {
        match self.movies.find(user_id, movie_id).await {
            Ok(Some(saved)) => SavedMovieStatus::saved(saved.user_rating),
            Ok(None) => SavedMovieStatus::not_saved(),
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    movie_id = %movie_id,
                    error = %error,
                    "watched movie lookup failed; reporting not saved"
                );
                SavedMovieStatus::not_saved()
            }
        }
    }

    /// Remove `movie` when saved, otherwise save it with `rating`.
    ///
    /// Saving without a rating is rejected with `InvalidRequest`.
    pub async fn toggle(
        &self,
        user_id: &UserId,
        movie: &Movie,
        rating: Option<Rating>,
    ) -> Result<SavedMovieStatus, Error> {
        let existing = self
            .movies
            .find(user_id, movie.id)
            .await
            .map_err(Self::map_error)?;

        if existing.is_some() {
            self.movies
                .remove(user_id, movie.id)
                .await
                .map_err(Self::map_error)?;
            info!(user_id = %user_id, movie_id = %movie.id, "movie removed from watched list");
            return Ok(SavedMovieStatus::not_saved());
        }

        let Some(rating) = rating else {
            return Err(
                Error::invalid_request("rating required").with_details(json!({ "field": "rating" }))
            );
        };
        let entry = SavedMovie {
            movie: movie.clone(),
            user_rating: rating,
        };
        self.movies
            .save(user_id, &entry)
            .await
            .map_err(Self::map_error)?;
        info!(
            user_id = %user_id,
            movie_id = %movie.id,
            rating = %rating,
            "movie saved to watched list"
        );
        Ok(SavedMovieStatus::saved(rating))
    }
}

/// State of the watched movies list screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedMoviesView {
    /// No snapshot has arrived yet.
    pub loading: bool,
    /// Saved entries from the latest snapshot.
    pub movies: Vec<SavedMovie>,
}

/// Live watched movies list for the signed-in user.
#[derive(Clone)]
pub struct WatchlistFeed<F> {
    feed: Arc<F>,
}

impl<F> WatchlistFeed<F>
where
    F: WatchedMoviesFeed,
{
    /// Create a list feed over the given port.
    pub fn new(feed: Arc<F>) -> Self {
        Self { feed }
    }

    /// Start observing the list of `user_id`.
    ///
    /// Without a user the empty, settled view is delivered at once and
    /// nothing is watched. Otherwise a loading view comes first, each
    /// snapshot replaces the list, and a failure settles loading while
    /// keeping the last list.
    pub fn start<L>(&self, user_id: Option<&UserId>, on_change: L) -> CancelHandle
    where
        L: Fn(SavedMoviesView) + Send + Sync + 'static,
    {
        let Some(user_id) = user_id else {
            on_change(SavedMoviesView::default());
            return CancelHandle::noop();
        };

        let list = Arc::new(ListState {
            view: Mutex::new(SavedMoviesView {
                loading: true,
                movies: Vec::new(),
            }),
            views: SerialDispatcher::new(on_change),
        });
        list.views.enqueue(list.current());
        list.views.drain();

        let receiver = Arc::clone(&list);
        let watched = user_id.clone();
        let listener: WatchedMoviesListener = Arc::new(move |result| {
            receiver.apply(&watched, result);
        });
        let mut subscription = self.feed.watch(user_id, listener);

        CancelHandle::new(move || {
            list.views.close();
            subscription.cancel();
        })
    }
}

struct ListState {
    view: Mutex<SavedMoviesView>,
    views: SerialDispatcher<SavedMoviesView>,
}

impl ListState {
    fn lock(&self) -> MutexGuard<'_, SavedMoviesView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> SavedMoviesView {
        self.lock().clone()
    }

    fn apply(&self, user_id: &UserId, result: Result<Vec<SavedMovie>, WatchedMoviesError>) {
        {
            let mut view = self.lock();
            view.loading = false;
            match result {
                Ok(movies) => {
                    debug!(user_id = %user_id, count = movies.len(), "watched movies updated");
                    view.movies = movies;
                }
                Err(error) => {
                    warn!(
                        user_id = %user_id,
                        error = %error,
                        "watched movies watch failed; keeping last list"
                    );
                }
            }
            self.views.enqueue(view.clone());
        }
        self.views.drain();
    }
}

#[cfg(test)]
#[path = "watchlist_service_tests.rs"]
mod tests;
