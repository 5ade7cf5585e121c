//! Demo entry-point: runs the app's flows against the in-memory backend.
//!
//! Every session transition and flow result is logged as JSON through
//! `tracing`; set `RUST_LOG=info` (or `debug`) to see them.

use std::env;
use std::io;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use client::ClientSettings;
use client::domain::ports::{AvatarUpload, FixtureMovieCatalogue};
use client::domain::{
    AccountService, AppFlow, DisplayName, Error, LoginCredentials, MovieSearchService, ProfileService,
    Rating, RegistrationRequest, SessionSynchronizer, SessionView, WatchlistFeed,
    WatchlistService,
};
use client::outbound::memory::{InMemoryAuthProvider, InMemoryAvatarStorage, InMemoryDocumentStore};

fn log_session(view: &SessionView) {
    info!(
        flow = ?AppFlow::from(view),
        user_id = view.identity().map(|identity| identity.id().to_string()),
        profile_name = view.profile().and_then(|profile| profile.name()),
        "session changed"
    );
}

fn domain_failure(err: Error) -> io::Error {
    serde_json::to_string(&err).map_or_else(|_| io::Error::other(err), io::Error::other)
}

fn invalid_input(err: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

/// Application bootstrap.
#[tokio::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ClientSettings::load_from_iter(env::args_os())
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    settings.validate().map_err(invalid_input)?;

    let auth = Arc::new(InMemoryAuthProvider::default());
    let documents = Arc::new(InMemoryDocumentStore::default());
    let avatars = Arc::new(InMemoryAvatarStorage::default());
    let catalogue = Arc::new(FixtureMovieCatalogue::default());

    let accounts = AccountService::new(Arc::clone(&auth), Arc::clone(&avatars), Arc::clone(&documents))
        .with_password_policy(settings.password_policy())
        .with_avatar_prefix(settings.avatar_prefix());
    let profiles = ProfileService::new(Arc::clone(&avatars), Arc::clone(&documents))
        .with_avatar_prefix(settings.avatar_prefix());
    let search = MovieSearchService::new(catalogue)
        .with_language(settings.catalogue_language())
        .with_image_base_url(settings.image_base_url());
    let watchlist = WatchlistService::new(Arc::clone(&documents));
    let feed = WatchlistFeed::new(Arc::clone(&documents));

    let synchronizer = SessionSynchronizer::new(Arc::clone(&auth), Arc::clone(&documents));
    let mut session = synchronizer.start(|view| log_session(&view));

    let request = RegistrationRequest {
        display_name: DisplayName::new("Ada Lovelace").map_err(invalid_input)?,
        credentials: LoginCredentials::try_from_parts("ada@example.com", "analytical")
            .map_err(invalid_input)?,
        avatar: Some(AvatarUpload::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png")),
    };
    let profile = accounts.register(&request).await.map_err(domain_failure)?;
    let user_id = profile.user_id().clone();

    let picture = profiles
        .update_avatar(&user_id, &AvatarUpload::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg"))
        .await
        .map_err(domain_failure)?;
    info!(picture = %picture, "profile picture replaced");

    let mut saved_list = feed.start(Some(&user_id), |view| {
        info!(loading = view.loading, saved = view.movies.len(), "watched movies changed");
    });

    let results = search.search("matrix").await.map_err(domain_failure)?;
    for movie in &results {
        info!(
            movie_id = %movie.id,
            title = movie.title.as_str(),
            poster = search.poster_url(movie).map(String::from),
            "search result"
        );
    }
    if let Some(movie) = results.first() {
        let rating = Rating::new(9).map_err(invalid_input)?;
        let status = watchlist
            .toggle(&user_id, movie, Some(rating))
            .await
            .map_err(domain_failure)?;
        info!(movie_id = %movie.id, saved = status.saved, "rating stored");
        let current = watchlist.status(&user_id, movie.id).await;
        info!(movie_id = %movie.id, rating = current.rating.map(u8::from), "rating read back");
    }

    saved_list.cancel();
    accounts.sign_out().await.map_err(domain_failure)?;
    accounts
        .sign_in(&request.credentials)
        .await
        .map_err(domain_failure)?;

    session.cancel();
    info!("demo finished");
    Ok(())
}
