//! Driven port for account operations on the hosted identity provider.
//!
//! Signing in or out does not return the new session state to the caller;
//! the provider announces it on the [`AuthStream`](super::AuthStream) and the
//! session synchronizer picks it up from there.

use async_trait::async_trait;

use crate::domain::{Identity, LoginCredentials};

use super::define_port_error;

define_port_error! {
    /// Failures reported by the identity provider.
    pub enum IdentityProviderError {
        /// Email/password pair was rejected.
        InvalidCredentials => "invalid email or password",
        /// An account with this email already exists.
        EmailAlreadyInUse { email: String } => "email already in use: {email}",
        /// The provider rejected the password as too weak.
        WeakPassword { message: String } => "weak password: {message}",
        /// The provider could not be reached.
        Unavailable { message: String } => "identity provider unavailable: {message}",
    }
}

/// Account lifecycle operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Identity, IdentityProviderError>;

    /// Create an account and sign it in.
    async fn create_account(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Identity, IdentityProviderError>;

    /// Sign out the current principal.
    async fn sign_out(&self) -> Result<(), IdentityProviderError>;
}
