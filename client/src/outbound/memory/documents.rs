//! In-process document store for profiles and watched movies.
//!
//! Layout mirrors the hosted store: `users/<uid>` holds the profile fields
//! and `users/<uid>/watched_movies/<movie id>` holds one JSON document per
//! saved movie. Documents are kept as JSON so reads go through the same
//! decoding as production snapshots.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::domain::ports::{
    ProfileListener, ProfileRepository, ProfileRepositoryError, ProfileSnapshot, ProfileStore,
    ProfileStoreError, WatchedMoviesError, WatchedMoviesFeed, WatchedMoviesListener,
    WatchedMoviesRepository,
};
use crate::domain::{CancelHandle, MovieId, PICTURE_FIELD, Profile, SavedMovie, UserId};

use super::lock;

const OFFLINE: &str = "document store offline";

struct Watcher<L> {
    id: u64,
    user_id: UserId,
    listener: L,
}

#[derive(Default)]
struct Documents {
    profiles: HashMap<UserId, Map<String, Value>>,
    watched: HashMap<UserId, BTreeMap<MovieId, Value>>,
    profile_watchers: Vec<Watcher<ProfileListener>>,
    list_watchers: Vec<Watcher<WatchedMoviesListener>>,
    next_watch: u64,
    offline: bool,
}

impl Documents {
    fn next_watch_id(&mut self) -> u64 {
        self.next_watch += 1;
        self.next_watch
    }

    fn profile_snapshot(&self, user_id: &UserId) -> Result<ProfileSnapshot, ProfileStoreError> {
        if self.offline {
            return Err(ProfileStoreError::unavailable(OFFLINE));
        }
        Ok(self
            .profiles
            .get(user_id)
            .cloned()
            .map_or_else(ProfileSnapshot::missing, ProfileSnapshot::existing))
    }

    fn watched_list(&self, user_id: &UserId) -> Result<Vec<SavedMovie>, WatchedMoviesError> {
        if self.offline {
            return Err(WatchedMoviesError::connection(OFFLINE));
        }
        self.watched
            .get(user_id)
            .map_or_else(|| Ok(Vec::new()), |entries| entries.values().map(decode_saved).collect())
    }

    fn profile_listeners(&self, user_id: &UserId) -> Vec<ProfileListener> {
        self.profile_watchers
            .iter()
            .filter(|watcher| &watcher.user_id == user_id)
            .map(|watcher| Arc::clone(&watcher.listener))
            .collect()
    }

    fn list_listeners(&self, user_id: &UserId) -> Vec<WatchedMoviesListener> {
        self.list_watchers
            .iter()
            .filter(|watcher| &watcher.user_id == user_id)
            .map(|watcher| Arc::clone(&watcher.listener))
            .collect()
    }

    fn watched_users(&self) -> BTreeSet<UserId> {
        self.profile_watchers
            .iter()
            .map(|watcher| watcher.user_id.clone())
            .chain(self.list_watchers.iter().map(|watcher| watcher.user_id.clone()))
            .collect()
    }

    fn ensure_online<E>(&self, error: impl FnOnce(&str) -> E) -> Result<(), E> {
        if self.offline {
            Err(error(OFFLINE))
        } else {
            Ok(())
        }
    }
}

fn decode_saved(document: &Value) -> Result<SavedMovie, WatchedMoviesError> {
    serde_json::from_value(document.clone())
        .map_err(|err| WatchedMoviesError::query(format!("stored entry unreadable: {err}")))
}

/// Profile and watched movie documents held in memory.
///
/// # Examples
/// ```
/// use std::sync::{Arc, Mutex};
/// use client::domain::UserId;
/// use client::domain::ports::{ProfileSnapshot, ProfileStore, ProfileStoreError};
/// use client::outbound::memory::InMemoryDocumentStore;
///
/// let store = InMemoryDocumentStore::default();
/// let user = UserId::new("u1").expect("id");
/// let exists = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&exists);
/// let _watch = store.watch(
///     &user,
///     Arc::new(move |snapshot: Result<ProfileSnapshot, ProfileStoreError>| {
///         sink.lock().unwrap().push(snapshot.is_ok_and(|s| s.exists()));
///     }),
/// );
///
/// store.put_profile_fields(&user, serde_json::Map::new());
/// store.delete_profile(&user);
/// assert_eq!(*exists.lock().unwrap(), vec![false, true, false]);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<Mutex<Documents>>,
}

impl InMemoryDocumentStore {
    /// Overwrite the raw fields of a profile document and notify watchers.
    pub fn put_profile_fields(&self, user_id: &UserId, fields: Map<String, Value>) {
        lock(&self.documents)
            .profiles
            .insert(user_id.clone(), fields);
        self.notify_profile(user_id);
    }

    /// Delete a profile document and notify watchers.
    pub fn delete_profile(&self, user_id: &UserId) {
        lock(&self.documents).profiles.remove(user_id);
        self.notify_profile(user_id);
    }

    /// Raw fields of a stored profile document.
    pub fn profile_fields(&self, user_id: &UserId) -> Option<Map<String, Value>> {
        lock(&self.documents).profiles.get(user_id).cloned()
    }

    /// Simulate losing or regaining the backend; watchers are told either way.
    pub fn set_offline(&self, offline: bool) {
        let users = {
            let mut documents = lock(&self.documents);
            documents.offline = offline;
            documents.watched_users()
        };
        debug!(offline, "document store connectivity changed");
        for user_id in &users {
            self.notify_profile(user_id);
            self.notify_list(user_id);
        }
    }

    /// Number of live profile and list watches.
    pub fn watch_count(&self) -> usize {
        let documents = lock(&self.documents);
        documents.profile_watchers.len() + documents.list_watchers.len()
    }

    fn notify_profile(&self, user_id: &UserId) {
        let (listeners, snapshot) = {
            let documents = lock(&self.documents);
            (
                documents.profile_listeners(user_id),
                documents.profile_snapshot(user_id),
            )
        };
        if listeners.is_empty() {
            return;
        }
        debug!(user_id = %user_id, watchers = listeners.len(), "profile document changed");
        for listener in listeners {
            listener(snapshot.clone());
        }
    }

    fn notify_list(&self, user_id: &UserId) {
        let (listeners, list) = {
            let documents = lock(&self.documents);
            (
                documents.list_listeners(user_id),
                documents.watched_list(user_id),
            )
        };
        if listeners.is_empty() {
            return;
        }
        debug!(user_id = %user_id, watchers = listeners.len(), "watched movies changed");
        for listener in listeners {
            listener(list.clone());
        }
    }
}

impl ProfileStore for InMemoryDocumentStore {
    fn watch(&self, user_id: &UserId, listener: ProfileListener) -> CancelHandle {
        let (id, snapshot) = {
            let mut documents = lock(&self.documents);
            let id = documents.next_watch_id();
            documents.profile_watchers.push(Watcher {
                id,
                user_id: user_id.clone(),
                listener: Arc::clone(&listener),
            });
            (id, documents.profile_snapshot(user_id))
        };
        listener(snapshot);

        let documents = Arc::clone(&self.documents);
        CancelHandle::new(move || {
            lock(&documents)
                .profile_watchers
                .retain(|watcher| watcher.id != id);
        })
    }
}

#[async_trait]
impl ProfileRepository for InMemoryDocumentStore {
    async fn put(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        {
            let mut documents = lock(&self.documents);
            documents.ensure_online(|message| ProfileRepositoryError::connection(message))?;
            documents
                .profiles
                .insert(profile.user_id().clone(), profile.to_fields());
        }
        self.notify_profile(profile.user_id());
        Ok(())
    }

    async fn update_picture(
        &self,
        user_id: &UserId,
        picture_url: &Url,
    ) -> Result<(), ProfileRepositoryError> {
        {
            let mut documents = lock(&self.documents);
            documents.ensure_online(|message| ProfileRepositoryError::connection(message))?;
            let fields = documents
                .profiles
                .get_mut(user_id)
                .ok_or_else(|| ProfileRepositoryError::not_found(user_id.to_string()))?;
            fields.insert(
                PICTURE_FIELD.to_owned(),
                Value::String(picture_url.as_str().to_owned()),
            );
        }
        self.notify_profile(user_id);
        Ok(())
    }
}

#[async_trait]
impl WatchedMoviesRepository for InMemoryDocumentStore {
    async fn find(
        &self,
        user_id: &UserId,
        movie_id: MovieId,
    ) -> Result<Option<SavedMovie>, WatchedMoviesError> {
        let documents = lock(&self.documents);
        documents.ensure_online(|message| WatchedMoviesError::connection(message))?;
        documents
            .watched
            .get(user_id)
            .and_then(|entries| entries.get(&movie_id))
            .map(decode_saved)
            .transpose()
    }

    async fn save(&self, user_id: &UserId, movie: &SavedMovie) -> Result<(), WatchedMoviesError> {
        let document = serde_json::to_value(movie)
            .map_err(|err| WatchedMoviesError::query(format!("entry not serialisable: {err}")))?;
        {
            let mut documents = lock(&self.documents);
            documents.ensure_online(|message| WatchedMoviesError::connection(message))?;
            documents
                .watched
                .entry(user_id.clone())
                .or_default()
                .insert(movie.movie.id, document);
        }
        self.notify_list(user_id);
        Ok(())
    }

    async fn remove(&self, user_id: &UserId, movie_id: MovieId) -> Result<(), WatchedMoviesError> {
        {
            let mut documents = lock(&self.documents);
            documents.ensure_online(|message| WatchedMoviesError::connection(message))?;
            if let Some(entries) = documents.watched.get_mut(user_id) {
                entries.remove(&movie_id);
            }
        }
        self.notify_list(user_id);
        Ok(())
    }
}

impl WatchedMoviesFeed for InMemoryDocumentStore {
    fn watch(&self, user_id: &UserId, listener: WatchedMoviesListener) -> CancelHandle {
        let (id, list) = {
            let mut documents = lock(&self.documents);
            let id = documents.next_watch_id();
            documents.list_watchers.push(Watcher {
                id,
                user_id: user_id.clone(),
                listener: Arc::clone(&listener),
            });
            (id, documents.watched_list(user_id))
        };
        listener(list);

        let documents = Arc::clone(&self.documents);
        CancelHandle::new(move || {
            lock(&documents)
                .list_watchers
                .retain(|watcher| watcher.id != id);
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{DisplayName, Movie, Rating};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn user_id() -> UserId {
        UserId::new("u1").expect("id")
    }

    fn ada(user_id: &UserId) -> Profile {
        let name = DisplayName::new("Ada").expect("name");
        Profile::new(user_id.clone(), &name, "ada@example.com")
    }

    fn saved(id: u64, rating: u8) -> SavedMovie {
        SavedMovie {
            movie: Movie::new(MovieId::new(id), format!("Movie {id}")),
            user_rating: Rating::new(rating).expect("rating"),
        }
    }

    type Seen<T> = Arc<Mutex<Vec<T>>>;

    fn profile_recorder() -> (Seen<Result<ProfileSnapshot, ProfileStoreError>>, ProfileListener) {
        let seen: Seen<_> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, Arc::new(move |snapshot| sink.lock().expect("seen").push(snapshot)))
    }

    #[rstest]
    #[tokio::test]
    async fn profile_watch_sees_writes_and_picture_updates(user_id: UserId) {
        let store = InMemoryDocumentStore::default();
        let (seen, listener) = profile_recorder();
        let _watch = ProfileStore::watch(&store, &user_id, listener);

        store.put(&ada(&user_id)).await.expect("put");
        let url = Url::parse("https://cdn.example.com/u1.png").expect("url");
        store.update_picture(&user_id, &url).await.expect("update");

        let seen = seen.lock().expect("seen").clone();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.first(), Some(&Ok(ProfileSnapshot::missing())));
        let last = seen
            .last()
            .cloned()
            .expect("snapshot")
            .expect("readable");
        assert_eq!(
            last.fields().and_then(|fields| fields.get(PICTURE_FIELD)),
            Some(&json!("https://cdn.example.com/u1.png"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn picture_update_requires_a_document(user_id: UserId) {
        let store = InMemoryDocumentStore::default();
        let url = Url::parse("https://cdn.example.com/u1.png").expect("url");

        let err = store
            .update_picture(&user_id, &url)
            .await
            .expect_err("missing document");
        assert_eq!(err, ProfileRepositoryError::not_found("u1"));
    }

    #[rstest]
    fn cancelled_watch_is_not_notified(user_id: UserId) {
        let store = InMemoryDocumentStore::default();
        let (seen, listener) = profile_recorder();
        let mut watch = ProfileStore::watch(&store, &user_id, listener);
        watch.cancel();

        store.put_profile_fields(&user_id, Map::new());
        assert_eq!(seen.lock().expect("seen").len(), 1);
        assert_eq!(store.watch_count(), 0);
    }

    #[rstest]
    fn offline_store_pushes_errors(user_id: UserId) {
        let store = InMemoryDocumentStore::default();
        let (seen, listener) = profile_recorder();
        let _watch = ProfileStore::watch(&store, &user_id, listener);

        store.set_offline(true);
        let seen = seen.lock().expect("seen").clone();
        assert_eq!(
            seen.last(),
            Some(&Err(ProfileStoreError::unavailable(OFFLINE)))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn watched_movies_round_trip_through_documents(user_id: UserId) {
        let store = InMemoryDocumentStore::default();
        let lists: Seen<Vec<u64>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lists);
        let _watch = WatchedMoviesFeed::watch(
            &store,
            &user_id,
            Arc::new(move |result: Result<Vec<SavedMovie>, WatchedMoviesError>| {
                let ids = result
                    .expect("readable")
                    .iter()
                    .map(|entry| entry.movie.id.get())
                    .collect();
                sink.lock().expect("lists").push(ids);
            }),
        );

        store.save(&user_id, &saved(603, 8)).await.expect("save");
        store.save(&user_id, &saved(598, 9)).await.expect("save");
        assert_eq!(
            store.find(&user_id, MovieId::new(598)).await.expect("find"),
            Some(saved(598, 9))
        );
        store.remove(&user_id, MovieId::new(603)).await.expect("remove");

        assert_eq!(
            *lists.lock().expect("lists"),
            vec![vec![], vec![603], vec![598, 603], vec![598]]
        );
    }
}
