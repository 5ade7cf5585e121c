//! Domain primitives, services and ports.
//!
//! Purpose: Define the strongly typed model the screens work with (identity,
//! profile, movies, ratings) and the services that drive the hosted backend
//! through the ports in [`ports`]. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - `SessionSynchronizer`: joins the auth stream with the profile document
//!   and publishes `SessionView`s.
//! - `AccountService`, `ProfileService`, `MovieSearchService`,
//!   `WatchlistService`, `WatchlistFeed`: flows behind the screens.
//! - Error (alias to `error::Error`) with its stable `ErrorCode`.

pub mod error;
pub mod ports;
pub mod user;

mod account_service;
mod auth;
mod dispatch;
mod movie;
mod movie_search_service;
mod profile;
mod profile_service;
mod session;
mod session_sync;
mod subscription;
mod watchlist_service;

pub use self::account_service::{AccountService, DEFAULT_AVATAR_PREFIX};
pub use self::auth::{
    DEFAULT_MIN_PASSWORD_LENGTH, LoginCredentials, LoginValidationError, PasswordPolicy,
    RegistrationRequest,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::movie::{
    Movie, MovieId, MovieValidationError, RATING_MAX, RATING_MIN, Rating, SavedMovie,
    SavedMovieStatus, SearchQuery,
};
pub use self::movie_search_service::{
    DEFAULT_CATALOGUE_LANGUAGE, DEFAULT_IMAGE_BASE_URL, MovieSearchService,
};
pub use self::profile::{EMAIL_FIELD, NAME_FIELD, PICTURE_FIELD, Profile, ProfileDecodeError};
pub use self::profile_service::ProfileService;
pub use self::session::{AppFlow, SessionView};
pub use self::session_sync::SessionSynchronizer;
pub use self::subscription::CancelHandle;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, Identity, USER_ID_MAX, UserId, UserValidationError,
};
pub use self::watchlist_service::{SavedMoviesView, WatchlistFeed, WatchlistService};
