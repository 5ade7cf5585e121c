//! Movie diary client core.
//!
//! Session state, accounts, profiles, movie search and watched-movie ratings
//! for the movie diary app, written against ports for the hosted backend so
//! the same flows run over the in-memory adapters in tests and demos.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Settings loaded from the environment, files and command line.
pub use config::{ClientSettings, ClientSettingsError};
