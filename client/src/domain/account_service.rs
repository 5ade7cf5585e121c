//! Account flows behind the login and registration screens.
//!
//! Success does not hand a session back to the screen. The identity provider
//! announces the new principal on its auth stream and the session
//! synchronizer takes over from there.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AvatarStorage, AvatarStorageError, IdentityProvider, IdentityProviderError, ProfileRepository,
    ProfileRepositoryError, avatar_object_path,
};
use crate::domain::{Error, Identity, LoginCredentials, PasswordPolicy, Profile, RegistrationRequest};

/// Default storage folder for profile pictures.
pub const DEFAULT_AVATAR_PREFIX: &str = "profile_pics";

/// Sign-in, registration and sign-out.
#[derive(Clone)]
pub struct AccountService<I, S, R> {
    identity: Arc<I>,
    avatars: Arc<S>,
    profiles: Arc<R>,
    policy: PasswordPolicy,
    avatar_prefix: String,
}

impl<I, S, R> AccountService<I, S, R> {
    /// Create a service with the default password policy and avatar folder.
    pub fn new(identity: Arc<I>, avatars: Arc<S>, profiles: Arc<R>) -> Self {
        Self {
            identity,
            avatars,
            profiles,
            policy: PasswordPolicy::default(),
            avatar_prefix: DEFAULT_AVATAR_PREFIX.to_owned(),
        }
    }

    /// Replace the password policy applied at registration.
    #[must_use]
    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the storage folder used for profile pictures.
    #[must_use]
    pub fn with_avatar_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.avatar_prefix = prefix.into();
        self
    }
}

impl<I, S, R> AccountService<I, S, R>
where
    I: IdentityProvider,
    S: AvatarStorage,
    R: ProfileRepository,
{
    fn map_identity_error(error: IdentityProviderError) -> Error {
        match error {
            IdentityProviderError::InvalidCredentials => {
                Error::unauthorized("invalid email or password")
            }
            IdentityProviderError::EmailAlreadyInUse { email } => {
                Error::conflict(format!("an account already exists for {email}"))
            }
            IdentityProviderError::WeakPassword { message } => {
                Error::invalid_request(format!("password rejected: {message}"))
            }
            IdentityProviderError::Unavailable { message } => {
                Error::service_unavailable(format!("identity provider unavailable: {message}"))
            }
        }
    }

    fn map_profile_error(error: ProfileRepositoryError) -> Error {
        match error {
            ProfileRepositoryError::NotFound { user_id } => {
                Error::not_found(format!("profile not found for user {user_id}"))
            }
            ProfileRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("profile store unavailable: {message}"))
            }
            ProfileRepositoryError::Write { message } => {
                Error::internal(format!("failed to save profile: {message}"))
            }
        }
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, credentials: &LoginCredentials) -> Result<Identity, Error> {
        let identity = self
            .identity
            .sign_in(credentials)
            .await
            .map_err(Self::map_identity_error)?;
        info!(user_id = %identity.id(), "signed in");
        Ok(identity)
    }

    /// Create an account, upload the optional avatar and write the profile.
    ///
    /// The account is created first; a failed upload leaves it without a
    /// profile document.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<Profile, Error> {
        if !self.policy.accepts(request.credentials.password()) {
            let min_length = self.policy.min_length();
            return Err(Error::invalid_request(format!(
                "password must have at least {min_length} characters"
            ))
            .with_details(json!({ "field": "password", "minLength": min_length })));
        }

        let identity = self
            .identity
            .create_account(&request.credentials)
            .await
            .map_err(Self::map_identity_error)?;

        let mut profile = Profile::new(
            identity.id().clone(),
            &request.display_name,
            request.credentials.email(),
        );
        if let Some(upload) = &request.avatar {
            let path = avatar_object_path(&self.avatar_prefix, identity.id());
            let url = self
                .avatars
                .upload(&path, upload)
                .await
                .map_err(|error: AvatarStorageError| {
                    warn!(user_id = %identity.id(), error = %error, "avatar upload failed");
                    Error::service_unavailable("could not upload the profile picture")
                })?;
            profile = profile.with_picture_url(url);
        }

        self.profiles
            .put(&profile)
            .await
            .map_err(Self::map_profile_error)?;
        info!(
            user_id = %identity.id(),
            has_picture = profile.picture_url().is_some(),
            "account registered"
        );
        Ok(profile)
    }

    /// End the current session.
    pub async fn sign_out(&self) -> Result<(), Error> {
        self.identity
            .sign_out()
            .await
            .map_err(Self::map_identity_error)?;
        info!("signed out");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
