//! Shared session state: who is signed in, and the last profile the API returned for them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::domain::User;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    UserChanged(User),
    SignedOut,
}

#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub bearer_token: Option<String>,
    /// Bumped once per applied update.
    pub revision: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

struct SessionState {
    user: Option<User>,
    bearer_token: Option<String>,
    revision: u64,
    updated_at: Option<DateTime<Utc>>,
}

/// Cloneable handle to the process-wide session. Created once at the composition root.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(RwLock::new(SessionState {
                user: None,
                bearer_token: None,
                revision: 0,
                updated_at: None,
            })),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.read().await;
        SessionSnapshot {
            user: guard.user.clone(),
            bearer_token: guard.bearer_token.clone(),
            revision: guard.revision,
            updated_at: guard.updated_at,
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn bearer_token(&self) -> Option<String> {
        self.inner.read().await.bearer_token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.user.is_some()
    }

    pub async fn revision(&self) -> u64 {
        self.inner.read().await.revision
    }

    /// Installs `user` as the signed-in identity, replacing whatever was there.
    pub async fn sign_in(&self, user: User, bearer_token: Option<String>) {
        let mut guard = self.inner.write().await;
        guard.bearer_token = bearer_token;
        Self::replace_user(&mut guard, user.clone());
        info!(user_id = %user.id, "session: signed in");
        let _ = self.events.send(SessionEvent::UserChanged(user));
    }

    /// Stores the token sent with authenticated requests, without touching the user.
    pub async fn set_bearer_token(&self, token: impl Into<String>) {
        self.inner.write().await.bearer_token = Some(token.into());
    }

    /// Applies the user returned by a successful sign-up.
    pub async fn apply_sign_up(&self, user: User) {
        let mut guard = self.inner.write().await;
        Self::replace_user(&mut guard, user.clone());
        info!(user_id = %user.id, "session: user registered");
        let _ = self.events.send(SessionEvent::UserChanged(user));
    }

    /// Replaces the signed-in user's company details with the ones on `user`.
    ///
    /// Last write wins; the rest of the current profile is left alone. With no one
    /// signed in, `user` becomes the session user.
    pub async fn persist_user_company_details(&self, user: User) {
        let mut guard = self.inner.write().await;
        let updated = match guard.user.take() {
            Some(mut current) => {
                current.company_details = user.company_details;
                current
            }
            None => user,
        };
        Self::replace_user(&mut guard, updated.clone());
        info!(
            user_id = %updated.id,
            has_company_details = updated.company_details.is_some(),
            "session: company details persisted"
        );
        // Sent under the write lock so subscribers see events in revision order.
        let _ = self.events.send(SessionEvent::UserChanged(updated));
    }

    pub async fn sign_out(&self) {
        let mut guard = self.inner.write().await;
        guard.user = None;
        guard.bearer_token = None;
        guard.revision += 1;
        guard.updated_at = Some(Utc::now());
        info!("session: signed out");
        let _ = self.events.send(SessionEvent::SignedOut);
    }

    fn replace_user(state: &mut SessionState, user: User) {
        state.user = Some(user);
        state.revision += 1;
        state.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
