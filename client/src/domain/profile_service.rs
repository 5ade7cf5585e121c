//! Profile picture updates from the profile tab.

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::domain::ports::{
    AvatarStorage, AvatarUpload, ProfileRepository, ProfileRepositoryError, avatar_object_path,
};
use crate::domain::{Error, UserId};

use super::account_service::DEFAULT_AVATAR_PREFIX;

/// Replaces a user's profile picture.
///
/// The new URL reaches the screen through the session synchronizer once the
/// document store pushes the updated profile.
#[derive(Clone)]
pub struct ProfileService<S, R> {
    avatars: Arc<S>,
    profiles: Arc<R>,
    avatar_prefix: String,
}

impl<S, R> ProfileService<S, R> {
    /// Create a service storing pictures under the default folder.
    pub fn new(avatars: Arc<S>, profiles: Arc<R>) -> Self {
        Self {
            avatars,
            profiles,
            avatar_prefix: DEFAULT_AVATAR_PREFIX.to_owned(),
        }
    }

    /// Replace the storage folder used for profile pictures.
    #[must_use]
    pub fn with_avatar_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.avatar_prefix = prefix.into();
        self
    }
}

impl<S, R> ProfileService<S, R>
where
    S: AvatarStorage,
    R: ProfileRepository,
{
    /// Upload `upload` and point the profile document at it.
    ///
    /// Only `profilePicUrl` is written; a missing document is `NotFound`.
    pub async fn update_avatar(&self, user_id: &UserId, upload: &AvatarUpload) -> Result<Url, Error> {
        let path = avatar_object_path(&self.avatar_prefix, user_id);
        let url = self.avatars.upload(&path, upload).await.map_err(|error| {
            warn!(user_id = %user_id, error = %error, "avatar upload failed");
            Error::service_unavailable("could not upload the profile picture")
        })?;

        self.profiles
            .update_picture(user_id, &url)
            .await
            .map_err(|error| match error {
                ProfileRepositoryError::NotFound { user_id: missing } => {
                    Error::not_found(format!("profile not found for user {missing}"))
                }
                ProfileRepositoryError::Connection { message } => {
                    Error::service_unavailable(format!("profile store unavailable: {message}"))
                }
                ProfileRepositoryError::Write { message } => {
                    Error::internal(format!("failed to update profile picture: {message}"))
                }
            })?;
        info!(user_id = %user_id, "profile picture updated");
        Ok(url)
    }
}
