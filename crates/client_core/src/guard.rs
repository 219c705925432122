//! Authentication guard around page data loading.

use std::future::Future;

use shared::domain::User;
use tracing::debug;

use crate::session::SessionContext;

pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome<T> {
    Render(T),
    Redirect { location: String },
}

impl<T> GuardOutcome<T> {
    pub fn into_rendered(self) -> Option<T> {
        match self {
            Self::Render(props) => Some(props),
            Self::Redirect { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionGuard {
    sign_in_path: String,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SIGN_IN_PATH)
    }
}

impl SessionGuard {
    pub fn new(sign_in_path: impl Into<String>) -> Self {
        Self {
            sign_in_path: sign_in_path.into(),
        }
    }

    /// Runs `loader` only for a signed-in session; otherwise redirects to sign-in.
    pub async fn with_auth<T, F, Fut>(&self, session: &SessionContext, loader: F) -> GuardOutcome<T>
    where
        F: FnOnce(User) -> Fut,
        Fut: Future<Output = T>,
    {
        match session.current_user().await {
            Some(user) => GuardOutcome::Render(loader(user).await),
            None => {
                debug!(location = %self.sign_in_path, "guard: no session, redirecting");
                GuardOutcome::Redirect {
                    location: self.sign_in_path.clone(),
                }
            }
        }
    }
}

/// [`SessionGuard::with_auth`] with the default sign-in location.
pub async fn with_auth<T, F, Fut>(session: &SessionContext, loader: F) -> GuardOutcome<T>
where
    F: FnOnce(User) -> Fut,
    Fut: Future<Output = T>,
{
    SessionGuard::default().with_auth(session, loader).await
}
