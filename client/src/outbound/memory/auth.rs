//! In-process identity provider and auth stream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{AuthListener, AuthStream, IdentityProvider, IdentityProviderError};
use crate::domain::{
    CancelHandle, DEFAULT_MIN_PASSWORD_LENGTH, Identity, LoginCredentials, UserId,
};

use super::lock;

struct Account {
    identity: Identity,
    password: Zeroizing<String>,
}

#[derive(Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    current: Option<Identity>,
    listeners: Vec<(u64, AuthListener)>,
    next_listener: u64,
}

impl AuthState {
    fn listeners(&self) -> Vec<AuthListener> {
        self.listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

/// Accounts and the signed-in principal, held in memory.
///
/// New subscribers receive the current principal immediately. Account
/// creation signs the new account in, as hosted providers do.
#[derive(Clone, Default)]
pub struct InMemoryAuthProvider {
    state: Arc<Mutex<AuthState>>,
}

impl InMemoryAuthProvider {
    /// Currently signed-in principal.
    pub fn current(&self) -> Option<Identity> {
        lock(&self.state).current.clone()
    }

    /// Number of live auth subscriptions.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    fn switch_to(&self, identity: Option<Identity>) {
        let listeners = {
            let mut state = lock(&self.state);
            state.current.clone_from(&identity);
            state.listeners()
        };
        debug!(
            user_id = identity.as_ref().map(|who| who.id().to_string()),
            listeners = listeners.len(),
            "auth state changed"
        );
        for listener in listeners {
            listener(identity.clone());
        }
    }
}

impl AuthStream for InMemoryAuthProvider {
    fn subscribe(&self, listener: AuthListener) -> CancelHandle {
        let (id, current) = {
            let mut state = lock(&self.state);
            state.next_listener += 1;
            let id = state.next_listener;
            state.listeners.push((id, Arc::clone(&listener)));
            (id, state.current.clone())
        };
        listener(current);

        let state = Arc::clone(&self.state);
        CancelHandle::new(move || {
            lock(&state).listeners.retain(|(existing, _)| *existing != id);
        })
    }
}

#[async_trait]
impl IdentityProvider for InMemoryAuthProvider {
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Identity, IdentityProviderError> {
        let identity = {
            let state = lock(&self.state);
            match state.accounts.get(credentials.email()) {
                Some(account) if account.password.as_str() == credentials.password() => {
                    account.identity.clone()
                }
                _ => return Err(IdentityProviderError::invalid_credentials()),
            }
        };
        self.switch_to(Some(identity.clone()));
        Ok(identity)
    }

    async fn create_account(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Identity, IdentityProviderError> {
        if credentials.password().chars().count() < DEFAULT_MIN_PASSWORD_LENGTH {
            return Err(IdentityProviderError::weak_password(format!(
                "at least {DEFAULT_MIN_PASSWORD_LENGTH} characters required"
            )));
        }

        let identity = {
            let mut state = lock(&self.state);
            if state.accounts.contains_key(credentials.email()) {
                return Err(IdentityProviderError::email_already_in_use(
                    credentials.email(),
                ));
            }
            let user_id = UserId::new(Uuid::new_v4().simple().to_string())
                .map_err(|err| IdentityProviderError::unavailable(err.to_string()))?;
            let identity = Identity::new(user_id).with_email(credentials.email());
            state.accounts.insert(
                credentials.email().to_owned(),
                Account {
                    identity: identity.clone(),
                    password: Zeroizing::new(credentials.password().to_owned()),
                },
            );
            identity
        };
        self.switch_to(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), IdentityProviderError> {
        self.switch_to(None);
        Ok(())
    }
}
