//! Mutation client for the account API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CompanyDetails, CreateUser, User},
    error::ApiError,
    protocol::{MutationResponse, COMPANY_DETAILS_PATH, CURRENT_USER_PATH, SIGN_UP_PATH},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::session::SessionContext;

/// Result of a request that reached the API and came back well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Accepted(User),
    /// `success: false`: the API understood the request and refused it.
    Rejected { message: Option<String> },
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("successful response did not include a user")]
    MissingUser,
}

impl MutationError {
    /// Body the server attached to a failed response, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// Typed error payload, when the body is one.
    pub fn api_error(&self) -> Option<ApiError> {
        self.response_body().and_then(ApiError::from_body)
    }
}

impl TryFrom<MutationResponse> for MutationOutcome {
    type Error = MutationError;

    fn try_from(response: MutationResponse) -> Result<Self, MutationError> {
        match (response.success, response.user) {
            (true, Some(user)) => Ok(Self::Accepted(user)),
            (true, None) => Err(MutationError::MissingUser),
            (false, _) => Ok(Self::Rejected {
                message: response.message,
            }),
        }
    }
}

#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn sign_up(&self, user: &CreateUser) -> Result<MutationOutcome, MutationError>;
    async fn save_company_details(
        &self,
        details: &CompanyDetails,
    ) -> Result<MutationOutcome, MutationError>;
    async fn current_user(&self) -> Result<User, MutationError>;
}

/// `AccountApi` over HTTP/JSON. One request per call, no retries.
///
/// Authenticated calls read the bearer token from the attached session on every
/// request, so signing out stops the header from being sent.
pub struct HttpAccountApi {
    http: Client,
    base_url: String,
    session: Option<SessionContext>,
}

impl HttpAccountApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = match &self.session {
            Some(session) => session.bearer_token().await,
            None => None,
        };
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, MutationError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(%status, "account api: request failed");
            return Err(MutationError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn mutation(&self, request: RequestBuilder) -> Result<MutationOutcome, MutationError> {
        let response = request.send().await?;
        let body: MutationResponse = Self::read_json(response).await?;
        let outcome = MutationOutcome::try_from(body)?;
        if let MutationOutcome::Rejected { message } = &outcome {
            warn!(message = ?message, "account api: mutation rejected");
        }
        Ok(outcome)
    }
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn sign_up(&self, user: &CreateUser) -> Result<MutationOutcome, MutationError> {
        info!(email = %user.email, "account api: sign up");
        self.mutation(self.http.post(self.url(SIGN_UP_PATH)).json(user))
            .await
    }

    async fn save_company_details(
        &self,
        details: &CompanyDetails,
    ) -> Result<MutationOutcome, MutationError> {
        info!(company = %details.name, "account api: save company details");
        let request = self.http.put(self.url(COMPANY_DETAILS_PATH)).json(details);
        self.mutation(self.authorized(request).await).await
    }

    async fn current_user(&self) -> Result<User, MutationError> {
        let request = self
            .authorized(self.http.get(self.url(CURRENT_USER_PATH)))
            .await;
        let response = request.send().await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
