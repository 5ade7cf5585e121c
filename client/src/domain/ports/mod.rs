//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to interact with the hosted backend
//! (authentication, document store, file storage) and the movie catalogue.
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_stream;
mod avatar_storage;
mod identity_provider;
mod movie_catalogue;
mod profile_repository;
mod profile_store;
mod watched_movies_repository;

#[cfg(test)]
pub use auth_stream::MockAuthStream;
pub use auth_stream::{AuthListener, AuthStream};
#[cfg(test)]
pub use avatar_storage::MockAvatarStorage;
pub use avatar_storage::{AvatarStorage, AvatarStorageError, AvatarUpload, avatar_object_path};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use movie_catalogue::MockMovieCatalogue;
pub use movie_catalogue::{FixtureMovieCatalogue, MovieCatalogue, MovieCatalogueError};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use profile_store::MockProfileStore;
pub use profile_store::{ProfileListener, ProfileSnapshot, ProfileStore, ProfileStoreError};
#[cfg(test)]
pub use watched_movies_repository::{MockWatchedMoviesFeed, MockWatchedMoviesRepository};
pub use watched_movies_repository::{
    WatchedMoviesError, WatchedMoviesFeed, WatchedMoviesListener, WatchedMoviesRepository,
};
