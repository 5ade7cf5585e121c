//! Port for profile picture uploads to hosted file storage.

use async_trait::async_trait;
use url::Url;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by avatar storage adapters.
    pub enum AvatarStorageError {
        /// The upload was rejected or interrupted.
        Upload { message: String } => "avatar upload failed: {message}",
        /// The stored object has no retrievable download URL.
        DownloadUrl { message: String } => "avatar download url unavailable: {message}",
    }
}

/// Image bytes picked from the gallery or camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    /// Encoded image.
    pub bytes: Vec<u8>,
    /// MIME type such as `image/jpeg`.
    pub content_type: String,
}

impl AvatarUpload {
    /// Wrap encoded image bytes.
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }
}

/// Object path of a user's profile picture under `prefix`.
///
/// # Examples
/// ```
/// use client::domain::UserId;
/// use client::domain::ports::avatar_object_path;
///
/// let user = UserId::new("u1").expect("id");
/// assert_eq!(avatar_object_path("profile_pics/", &user), "profile_pics/u1");
/// ```
pub fn avatar_object_path(prefix: &str, user_id: &UserId) -> String {
    let folder = prefix.trim_end_matches('/');
    if folder.is_empty() {
        user_id.to_string()
    } else {
        format!("{folder}/{user_id}")
    }
}

/// Object storage for profile pictures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStorage: Send + Sync {
    /// Store `upload` at `object_path`, replacing any previous object, and
    /// return its public download URL.
    async fn upload(
        &self,
        object_path: &str,
        upload: &AvatarUpload,
    ) -> Result<Url, AvatarStorageError>;
}
