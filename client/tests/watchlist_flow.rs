//! Search, rate and list movies end to end over the in-memory backend.

use std::sync::{Arc, Mutex};

use client::domain::ports::FixtureMovieCatalogue;
use client::domain::{
    ErrorCode, Movie, MovieSearchService, Rating, SavedMovieStatus, SavedMoviesView, UserId,
    WatchlistFeed, WatchlistService,
};
use client::outbound::memory::InMemoryDocumentStore;
use rstest::{fixture, rstest};
use serde_json::json;

#[derive(Clone, Default)]
struct ListRecorder {
    seen: Arc<Mutex<Vec<SavedMoviesView>>>,
}

impl ListRecorder {
    fn listener(&self) -> impl Fn(SavedMoviesView) + Send + Sync + 'static {
        let sink = Arc::clone(&self.seen);
        move |view| sink.lock().expect("views").push(view)
    }

    fn last(&self) -> SavedMoviesView {
        self.seen
            .lock()
            .expect("views")
            .last()
            .cloned()
            .expect("at least one view")
    }

    fn len(&self) -> usize {
        self.seen.lock().expect("views").len()
    }
}

#[fixture]
fn user_id() -> UserId {
    UserId::new("ada").expect("id")
}

#[fixture]
fn documents() -> Arc<InMemoryDocumentStore> {
    Arc::new(InMemoryDocumentStore::default())
}

async fn first_match(raw: &str) -> Movie {
    let search = MovieSearchService::new(Arc::new(FixtureMovieCatalogue::default()));
    search
        .search(raw)
        .await
        .expect("search")
        .into_iter()
        .next()
        .expect("a match")
}

fn titles(view: &SavedMoviesView) -> Vec<&str> {
    view.movies.iter().map(|saved| saved.movie.title.as_str()).collect()
}

#[rstest]
#[tokio::test]
async fn rating_a_search_result_lands_on_the_live_list(
    user_id: UserId,
    documents: Arc<InMemoryDocumentStore>,
) {
    let watchlist = WatchlistService::new(Arc::clone(&documents));
    let recorder = ListRecorder::default();
    let _feed = WatchlistFeed::new(Arc::clone(&documents)).start(Some(&user_id), recorder.listener());

    let matrix = first_match("matrix").await;
    let rating = Rating::new(9).expect("rating");
    let status = watchlist
        .toggle(&user_id, &matrix, Some(rating))
        .await
        .expect("saved");

    assert_eq!(status, SavedMovieStatus::saved(rating));
    assert_eq!(watchlist.status(&user_id, matrix.id).await, status);
    let last = recorder.last();
    assert!(!last.loading);
    assert_eq!(titles(&last), vec!["Matrix"]);
    assert_eq!(
        last.movies.first().map(|saved| saved.user_rating),
        Some(rating)
    );
}

#[rstest]
#[tokio::test]
async fn toggling_twice_removes_the_entry(user_id: UserId, documents: Arc<InMemoryDocumentStore>) {
    let watchlist = WatchlistService::new(Arc::clone(&documents));
    let recorder = ListRecorder::default();
    let _feed = WatchlistFeed::new(Arc::clone(&documents)).start(Some(&user_id), recorder.listener());
    let city = first_match("cidade").await;

    watchlist
        .toggle(&user_id, &city, Rating::new(10).ok())
        .await
        .expect("saved");
    let status = watchlist
        .toggle(&user_id, &city, None)
        .await
        .expect("removed");

    assert_eq!(status, SavedMovieStatus::not_saved());
    assert!(recorder.last().movies.is_empty());
}

#[rstest]
#[tokio::test]
async fn saving_without_a_rating_is_refused(
    user_id: UserId,
    documents: Arc<InMemoryDocumentStore>,
) {
    let watchlist = WatchlistService::new(Arc::clone(&documents));
    let central = first_match("central").await;

    let err = watchlist
        .toggle(&user_id, &central, None)
        .await
        .expect_err("rating required");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        serde_json::to_value(&err).expect("serialise"),
        json!({
            "code": "invalid_request",
            "message": "rating required",
            "details": { "field": "rating" },
        })
    );
    assert_eq!(
        watchlist.status(&user_id, central.id).await,
        SavedMovieStatus::not_saved()
    );
}

#[rstest]
#[tokio::test]
async fn outage_keeps_the_last_list_and_status_degrades(
    user_id: UserId,
    documents: Arc<InMemoryDocumentStore>,
) {
    let watchlist = WatchlistService::new(Arc::clone(&documents));
    let recorder = ListRecorder::default();
    let _feed = WatchlistFeed::new(Arc::clone(&documents)).start(Some(&user_id), recorder.listener());
    let matrix = first_match("matrix").await;
    watchlist
        .toggle(&user_id, &matrix, Rating::new(7).ok())
        .await
        .expect("saved");

    documents.set_offline(true);

    let last = recorder.last();
    assert!(!last.loading);
    assert_eq!(titles(&last), vec!["Matrix"]);
    assert_eq!(
        watchlist.status(&user_id, matrix.id).await,
        SavedMovieStatus::not_saved()
    );
    let err = watchlist
        .toggle(&user_id, &matrix, None)
        .await
        .expect_err("offline");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn cancelled_feed_stops_receiving(user_id: UserId, documents: Arc<InMemoryDocumentStore>) {
    let watchlist = WatchlistService::new(Arc::clone(&documents));
    let recorder = ListRecorder::default();
    let mut feed =
        WatchlistFeed::new(Arc::clone(&documents)).start(Some(&user_id), recorder.listener());
    assert_eq!(documents.watch_count(), 1);

    feed.cancel();
    let seen = recorder.len();
    let matrix = first_match("matrix").await;
    watchlist
        .toggle(&user_id, &matrix, Rating::new(5).ok())
        .await
        .expect("saved");

    assert_eq!(documents.watch_count(), 0);
    assert_eq!(recorder.len(), seen);
}

#[rstest]
fn signed_out_list_is_settled_and_empty(documents: Arc<InMemoryDocumentStore>) {
    let recorder = ListRecorder::default();
    let _feed = WatchlistFeed::new(Arc::clone(&documents)).start(None, recorder.listener());

    assert_eq!(recorder.last(), SavedMoviesView::default());
    assert_eq!(documents.watch_count(), 0);
}
