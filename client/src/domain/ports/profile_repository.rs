//! Port abstraction for profile document writes.
use async_trait::async_trait;
use url::Url;

use crate::domain::{Profile, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// No profile document exists for the user.
        NotFound { user_id: String } => "profile not found for user {user_id}",
        /// Repository connection could not be established.
        Connection { message: String } => "profile repository connection failed: {message}",
        /// Write was rejected by the backend.
        Write { message: String } => "profile repository write failed: {message}",
    }
}

/// Write side of `users/<uid>` profile documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create or replace the full profile document.
    async fn put(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;

    /// Update only the picture URL of an existing document.
    async fn update_picture(
        &self,
        user_id: &UserId,
        picture_url: &Url,
    ) -> Result<(), ProfileRepositoryError>;
}
