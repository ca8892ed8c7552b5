//! Reactive auth-state projection.
//!
//! DESIGN
//! ======
//! One injectable store object instead of ambient globals: construct with
//! [`AuthState::init`] at startup, pass clones (cheap, `Arc`-backed) to
//! whatever needs to read or mutate auth state. Every mutation persists
//! through the [`CredentialStore`] first and only then broadcasts on the
//! watch channel, so subscribers never observe state the store does not
//! hold.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::Error;
use crate::session::store::CredentialStore;
use crate::session::types::{Session, User};

/// Single reactive source of truth for "who is logged in".
#[derive(Clone)]
pub struct AuthState {
    store: Arc<CredentialStore>,
    session: Arc<watch::Sender<Option<Session>>>,
}

impl AuthState {
    /// Hydrates the projection from whatever the store last persisted.
    #[must_use]
    pub fn init(store: CredentialStore) -> Self {
        let (session, _) = watch::channel(store.load());
        Self {
            store: Arc::new(store),
            session: Arc::new(session),
        }
    }

    /// Subscribe to session transitions (login, logout, token refresh).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    /// Current session snapshot, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Current user identity, if logged in.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Current access token, if logged in.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Whether a full session (user + tokens) is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Installs a freshly issued session: persists it, then broadcasts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the session cannot be persisted; the
    /// in-memory projection is left unchanged in that case.
    pub fn login_success(&self, session: Session) -> Result<(), Error> {
        self.store.save(&session)?;
        self.session.send_replace(Some(session));
        Ok(())
    }

    /// Replaces the access token in place; user and refresh token are
    /// untouched. A no-op when logged out, since there is no session to
    /// update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the updated session cannot be persisted.
    pub fn update_access_token(&self, access_token: &str) -> Result<(), Error> {
        let Some(current) = self.session() else {
            return Ok(());
        };
        let updated = current.with_access_token(access_token.to_owned());
        self.store.save(&updated)?;
        self.session.send_replace(Some(updated));
        Ok(())
    }

    /// Clears the session locally: store first, then the projection.
    /// Idempotent: clearing a logged-out state is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the persisted record cannot be removed.
    pub fn clear(&self) -> Result<(), Error> {
        self.store.clear()?;
        self.session.send_replace(None);
        Ok(())
    }
}
