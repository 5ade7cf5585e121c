//! Client configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{
    DEFAULT_AVATAR_PREFIX, DEFAULT_CATALOGUE_LANGUAGE, DEFAULT_IMAGE_BASE_URL, PasswordPolicy,
};

/// Settings that loaded but cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientSettingsError {
    /// `image_base_url` is not an absolute URL.
    #[error("image base url `{value}` is invalid: {message}")]
    InvalidImageBaseUrl {
        /// Configured value.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// `min_password_length` is zero.
    #[error("minimum password length must be positive")]
    ZeroPasswordLength,
}

/// Configuration values for the movie diary client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MOVIE_DIARY")]
pub struct ClientSettings {
    /// Language requested from the movie catalogue (BCP 47).
    pub catalogue_language: Option<String>,
    /// Base URL poster paths are joined to.
    pub image_base_url: Option<String>,
    /// Storage folder for profile pictures.
    pub avatar_prefix: Option<String>,
    /// Minimum password length accepted at registration.
    #[ortho_config(default = 6)]
    pub min_password_length: usize,
}

impl ClientSettings {
    /// Return the configured catalogue language, falling back to the default.
    pub fn catalogue_language(&self) -> &str {
        self.catalogue_language
            .as_deref()
            .unwrap_or(DEFAULT_CATALOGUE_LANGUAGE)
    }

    /// Return the configured image base URL, falling back to the default.
    pub fn image_base_url(&self) -> &str {
        self.image_base_url
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    /// Return the configured avatar folder, falling back to the default.
    pub fn avatar_prefix(&self) -> &str {
        self.avatar_prefix.as_deref().unwrap_or(DEFAULT_AVATAR_PREFIX)
    }

    /// Reject values the services cannot work with.
    pub fn validate(&self) -> Result<(), ClientSettingsError> {
        let base = self.image_base_url();
        Url::parse(base).map_err(|err| ClientSettingsError::InvalidImageBaseUrl {
            value: base.to_owned(),
            message: err.to_string(),
        })?;
        if self.min_password_length == 0 {
            return Err(ClientSettingsError::ZeroPasswordLength);
        }
        Ok(())
    }

    /// Password policy built from the configured minimum length.
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.min_password_length)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use crate::domain::DEFAULT_MIN_PASSWORD_LENGTH;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("client")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("MOVIE_DIARY_CATALOGUE_LANGUAGE", None::<String>),
            ("MOVIE_DIARY_IMAGE_BASE_URL", None::<String>),
            ("MOVIE_DIARY_AVATAR_PREFIX", None::<String>),
            ("MOVIE_DIARY_MIN_PASSWORD_LENGTH", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.catalogue_language(), "pt-BR");
        assert_eq!(settings.image_base_url(), DEFAULT_IMAGE_BASE_URL);
        assert_eq!(settings.avatar_prefix(), "profile_pics");
        assert_eq!(settings.min_password_length, DEFAULT_MIN_PASSWORD_LENGTH);
        assert_eq!(settings.password_policy(), PasswordPolicy::default());
        assert_eq!(settings.validate(), Ok(()));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("MOVIE_DIARY_CATALOGUE_LANGUAGE", Some("en-GB".to_owned())),
            (
                "MOVIE_DIARY_IMAGE_BASE_URL",
                Some("https://img.example.com/w185".to_owned()),
            ),
            ("MOVIE_DIARY_AVATAR_PREFIX", Some("avatars".to_owned())),
            ("MOVIE_DIARY_MIN_PASSWORD_LENGTH", Some("10".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.catalogue_language(), "en-GB");
        assert_eq!(settings.image_base_url(), "https://img.example.com/w185");
        assert_eq!(settings.avatar_prefix(), "avatars");
        assert_eq!(settings.password_policy().min_length(), 10);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[rstest]
    fn relative_image_base_url_is_rejected() {
        let _guard = lock_env([
            ("MOVIE_DIARY_IMAGE_BASE_URL", Some("t/p/w500".to_owned())),
            ("MOVIE_DIARY_MIN_PASSWORD_LENGTH", None::<String>),
        ]);

        let err = load_from_empty_args()
            .validate()
            .expect_err("relative url");
        assert!(matches!(
            err,
            ClientSettingsError::InvalidImageBaseUrl { ref value, .. } if value == "t/p/w500"
        ));
    }

    #[rstest]
    fn zero_password_length_is_rejected() {
        let _guard = lock_env([
            ("MOVIE_DIARY_IMAGE_BASE_URL", None::<String>),
            ("MOVIE_DIARY_MIN_PASSWORD_LENGTH", Some("0".to_owned())),
        ]);

        assert_eq!(
            load_from_empty_args().validate(),
            Err(ClientSettingsError::ZeroPasswordLength)
        );
    }
}
