//! Session state synchronizer.
//!
//! Joins the authentication stream with the profile document of whoever is
//! signed in and publishes a single [`SessionView`] after every transition.
//!
//! States and transitions:
//! - before the first auth event the view is [`SessionView::initial`];
//! - identity `I` announced: the current profile watch is cancelled (even
//!   when `I` is unchanged), `AwaitingProfile(I)` is published, then a new
//!   watch on `I` is opened;
//! - snapshot or watch error for the current watch: `Ready(I, profile)`,
//!   with read failures degrading to "no profile";
//! - sign-out: the profile watch is cancelled and the signed-out view is
//!   published immediately.
//!
//! Every profile watch is tagged with a generation number. Deliveries from a
//! watch whose generation is no longer current are discarded, so a snapshot
//! the provider had already scheduled can never land after a newer auth
//! event has been observed.
//!
//! Providers may call back on any thread. Transitions run under one mutex
//! and views are queued on a serial dispatcher before it is released;
//! provider calls are made with the mutex released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::dispatch::SerialDispatcher;
use super::ports::{
    AuthListener, AuthStream, ProfileListener, ProfileSnapshot, ProfileStore, ProfileStoreError,
};
use super::{CancelHandle, Identity, Profile, SessionView, UserId};

/// Derives [`SessionView`]s from an [`AuthStream`] and a [`ProfileStore`].
///
/// # Examples
/// ```
/// use std::sync::{Arc, Mutex};
/// use client::domain::{SessionSynchronizer, SessionView};
/// use client::outbound::memory::{InMemoryAuthProvider, InMemoryDocumentStore};
///
/// let auth = Arc::new(InMemoryAuthProvider::default());
/// let documents = Arc::new(InMemoryDocumentStore::default());
/// let synchronizer = SessionSynchronizer::new(auth, documents);
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let mut handle = synchronizer.start(move |view| sink.lock().unwrap().push(view));
/// handle.cancel();
///
/// let seen = seen.lock().unwrap();
/// assert_eq!(seen.first(), Some(&SessionView::initial()));
/// assert_eq!(seen.last(), Some(&SessionView::signed_out()));
/// ```
pub struct SessionSynchronizer<A, P> {
    auth: Arc<A>,
    profiles: Arc<P>,
}

impl<A, P> Clone for SessionSynchronizer<A, P> {
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            profiles: Arc::clone(&self.profiles),
        }
    }
}

impl<A, P> SessionSynchronizer<A, P>
where
    A: AuthStream + 'static,
    P: ProfileStore + 'static,
{
    /// Create a synchronizer over the given providers.
    pub fn new(auth: Arc<A>, profiles: Arc<P>) -> Self {
        Self { auth, profiles }
    }

    /// Begin observing; `on_change` receives every view, starting with
    /// [`SessionView::initial`].
    ///
    /// The returned handle stops observation and releases both provider
    /// subscriptions. No call to `on_change` starts after it is cancelled.
    pub fn start<F>(&self, on_change: F) -> CancelHandle
    where
        F: Fn(SessionView) + Send + Sync + 'static,
    {
        let session = Arc::new(Session {
            profiles: Arc::clone(&self.profiles),
            views: SerialDispatcher::new(on_change),
            state: Mutex::new(SessionState::default()),
        });
        session.views.enqueue(SessionView::initial());
        session.views.drain();

        let weak = Arc::downgrade(&session);
        let listener: AuthListener = Arc::new(move |identity| {
            if let Some(session) = weak.upgrade() {
                session.handle_auth(identity);
            }
        });
        let subscription = self.auth.subscribe(listener);
        session.attach_auth(subscription);
        info!("session synchronizer started");

        CancelHandle::new(move || session.stop())
    }

    /// Begin observing into a `watch` channel for async consumers.
    ///
    /// The receiver always holds the latest view; the handle behaves as for
    /// [`SessionSynchronizer::start`].
    pub fn start_watch(&self) -> (watch::Receiver<SessionView>, CancelHandle) {
        let (sender, receiver) = watch::channel(SessionView::initial());
        let handle = self.start(move |view| {
            sender.send_replace(view);
        });
        (receiver, handle)
    }
}

struct Session<P> {
    profiles: Arc<P>,
    views: SerialDispatcher<SessionView>,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    generation: u64,
    auth_subscription: Option<CancelHandle>,
    profile_subscription: Option<CancelHandle>,
    stopped: bool,
}

impl<P> Session<P>
where
    P: ProfileStore + 'static,
{
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn attach_auth(&self, mut subscription: CancelHandle) {
        let mut state = self.lock();
        if state.stopped {
            drop(state);
            subscription.cancel();
            return;
        }
        state.auth_subscription = Some(subscription);
    }

    fn handle_auth(self: &Arc<Self>, identity: Option<Identity>) {
        let (generation, superseded) = {
            let mut state = self.lock();
            if state.stopped {
                return;
            }
            state.generation += 1;
            let superseded = state.profile_subscription.take();
            let view = match &identity {
                Some(identity) => {
                    debug!(
                        user_id = %identity.id(),
                        generation = state.generation,
                        "identity announced; awaiting profile"
                    );
                    SessionView::awaiting_profile(identity.clone())
                }
                None => {
                    debug!(generation = state.generation, "signed out");
                    SessionView::signed_out()
                }
            };
            self.views.enqueue(view);
            (state.generation, superseded)
        };

        if let Some(mut superseded) = superseded {
            superseded.cancel();
        }
        if let Some(identity) = identity {
            self.open_profile_watch(generation, identity);
        }
        self.views.drain();
    }

    fn open_profile_watch(self: &Arc<Self>, generation: u64, identity: Identity) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let watched = identity.clone();
        let listener: ProfileListener = Arc::new(move |result| {
            if let Some(session) = weak.upgrade() {
                session.handle_profile(generation, &watched, result);
            }
        });

        let mut subscription = self.profiles.watch(identity.id(), listener);

        let mut state = self.lock();
        if state.stopped || state.generation != generation {
            drop(state);
            subscription.cancel();
            return;
        }
        state.profile_subscription = Some(subscription);
    }

    fn handle_profile(
        &self,
        generation: u64,
        identity: &Identity,
        result: Result<ProfileSnapshot, ProfileStoreError>,
    ) {
        {
            let state = self.lock();
            if state.stopped || state.generation != generation {
                debug!(
                    user_id = %identity.id(),
                    generation,
                    current = state.generation,
                    "discarding delivery from superseded profile watch"
                );
                return;
            }

            let profile = match result {
                Ok(snapshot) => decode_snapshot(identity.id(), &snapshot),
                Err(error) => {
                    warn!(
                        user_id = %identity.id(),
                        error = %error,
                        "profile watch failed; continuing without profile"
                    );
                    None
                }
            };
            debug!(
                user_id = %identity.id(),
                generation,
                has_profile = profile.is_some(),
                "session ready"
            );
            self.views
                .enqueue(SessionView::ready(identity.clone(), profile));
        }
        self.views.drain();
    }

    fn stop(&self) {
        let (auth, profile) = {
            let mut state = self.lock();
            if state.stopped {
                return;
            }
            state.stopped = true;
            self.views.close();
            (
                state.auth_subscription.take(),
                state.profile_subscription.take(),
            )
        };

        if let Some(mut auth) = auth {
            auth.cancel();
        }
        if let Some(mut profile) = profile {
            profile.cancel();
        }
        info!("session synchronizer stopped");
    }
}

fn decode_snapshot(user_id: &UserId, snapshot: &ProfileSnapshot) -> Option<Profile> {
    let fields = snapshot.fields()?;
    match Profile::from_fields(user_id.clone(), fields) {
        Ok(profile) => Some(profile),
        Err(error) => {
            warn!(
                user_id = %user_id,
                error = %error,
                "profile document unreadable; continuing without profile"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "session_sync_tests.rs"]
mod tests;
