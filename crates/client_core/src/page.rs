//! Page-level orchestration: validate, submit once, update the session, notify.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;
use shared::domain::{CompanyDetails, CreateUser, User};
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    api::{AccountApi, MutationError, MutationOutcome},
    form::{FieldErrors, Form, FormRecord, Validated},
    notify::{Notification, Notifier},
    session::{SessionContext, SessionEvent},
};

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, Try again!";
pub const COMPANY_SAVED_MESSAGE: &str = "Company details saved successfully!";
pub const ACCOUNT_CREATED_MESSAGE: &str = "Account created successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Per-form submission state. At most one submission is past `Idle` at a time.
#[derive(Clone)]
pub struct SubmissionMachine {
    phase: Arc<Mutex<SubmissionPhase>>,
}

impl Default for SubmissionMachine {
    fn default() -> Self {
        Self {
            phase: Arc::new(Mutex::new(SubmissionPhase::Idle)),
        }
    }
}

impl SubmissionMachine {
    pub fn phase(&self) -> SubmissionPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.phase() != SubmissionPhase::Idle
    }

    /// Moves `Idle -> Validating`. Returns `None` while another submission is running.
    pub fn begin(&self) -> Option<InFlight> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != SubmissionPhase::Idle {
            return None;
        }
        *phase = SubmissionPhase::Validating;
        Some(InFlight {
            phase: Arc::clone(&self.phase),
        })
    }
}

/// Holds the machine out of `Idle`; dropping it returns the machine to `Idle`.
pub struct InFlight {
    phase: Arc<Mutex<SubmissionPhase>>,
}

impl InFlight {
    pub fn advance(&self, next: SubmissionPhase) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*phase, to = ?next, "submission transition");
        *phase = next;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = SubmissionPhase::Idle;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// Well-formed `success: false` response.
    Rejected { message: Option<String> },
    /// The request itself failed. Carries the text shown to the user.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReport<F: Ord> {
    /// Another submission on this page was still running; nothing was sent.
    Busy,
    Invalid(FieldErrors<F>),
    Saved(User),
    Failed(SubmitFailure),
}

/// What a page does with a validated record.
#[async_trait]
pub trait PageAction: Send + Sync + 'static {
    type Record: FormRecord;

    fn name(&self) -> &'static str;

    fn success_message(&self) -> &'static str;

    async fn mutate(
        &self,
        api: &dyn AccountApi,
        record: &Validated<Self::Record>,
    ) -> Result<MutationOutcome, MutationError>;

    async fn apply(&self, session: &SessionContext, user: User);

    /// Form values to show for the given session user.
    fn hydrate(&self, _user: Option<&User>) -> Option<Self::Record> {
        None
    }
}

pub struct SaveCompanyDetails;

#[async_trait]
impl PageAction for SaveCompanyDetails {
    type Record = CompanyDetails;

    fn name(&self) -> &'static str {
        "setup_my_company"
    }

    fn success_message(&self) -> &'static str {
        COMPANY_SAVED_MESSAGE
    }

    async fn mutate(
        &self,
        api: &dyn AccountApi,
        record: &Validated<CompanyDetails>,
    ) -> Result<MutationOutcome, MutationError> {
        api.save_company_details(record).await
    }

    async fn apply(&self, session: &SessionContext, user: User) {
        session.persist_user_company_details(user).await;
    }

    fn hydrate(&self, user: Option<&User>) -> Option<CompanyDetails> {
        Some(
            user.and_then(User::company_details)
                .cloned()
                .unwrap_or_default(),
        )
    }
}

pub struct SignUp;

#[async_trait]
impl PageAction for SignUp {
    type Record = CreateUser;

    fn name(&self) -> &'static str {
        "sign_up"
    }

    fn success_message(&self) -> &'static str {
        ACCOUNT_CREATED_MESSAGE
    }

    async fn mutate(
        &self,
        api: &dyn AccountApi,
        record: &Validated<CreateUser>,
    ) -> Result<MutationOutcome, MutationError> {
        api.sign_up(record).await
    }

    async fn apply(&self, session: &SessionContext, user: User) {
        session.apply_sign_up(user).await;
    }
}

pub struct FormPage<A: PageAction> {
    action: A,
    form: tokio::sync::Mutex<Form<A::Record>>,
    submission: SubmissionMachine,
    api: Arc<dyn AccountApi>,
    session: SessionContext,
    notifier: Arc<dyn Notifier>,
    /// Dropped with the page; wakes session watchers so they exit.
    closed: watch::Sender<()>,
}

pub type CompanySetupPage = FormPage<SaveCompanyDetails>;
pub type SignUpPage = FormPage<SignUp>;

pub type PageReport<A> = SubmitReport<<<A as PageAction>::Record as FormRecord>::Field>;

impl<A: PageAction> FormPage<A> {
    /// Builds the page and fills the form from the current session user.
    pub async fn open(
        action: A,
        api: Arc<dyn AccountApi>,
        session: SessionContext,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let page = Self {
            action,
            form: tokio::sync::Mutex::new(Form::default()),
            submission: SubmissionMachine::default(),
            api,
            session,
            notifier,
            closed: watch::channel(()).0,
        };
        page.hydrate_from_session().await;
        page
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.submission.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.submission.is_busy()
    }

    /// Runs `edit` against the form, e.g. to `register` fields and type into them.
    pub async fn with_form<T>(&self, edit: impl FnOnce(&mut Form<A::Record>) -> T) -> T {
        let mut form = self.form.lock().await;
        edit(&mut form)
    }

    pub async fn values(&self) -> A::Record {
        self.form.lock().await.values().clone()
    }

    pub async fn errors(&self) -> FieldErrors<<A::Record as FormRecord>::Field> {
        self.form.lock().await.errors().clone()
    }

    pub async fn hydrate_from_session(&self) {
        let user = self.session.current_user().await;
        if let Some(defaults) = self.action.hydrate(user.as_ref()) {
            self.form.lock().await.reset(defaults);
        }
    }

    /// Validates and submits the form. Every failure ends up as a notification.
    pub async fn submit(&self) -> PageReport<A> {
        let page = self.action.name();
        let Some(in_flight) = self.submission.begin() else {
            debug!(page, "submit ignored while a submission is in flight");
            return SubmitReport::Busy;
        };

        let record = {
            let mut form = self.form.lock().await;
            match form.handle_submit(|record| record) {
                Some(record) => record,
                None => return SubmitReport::Invalid(form.errors().clone()),
            }
        };

        in_flight.advance(SubmissionPhase::Submitting);
        match self.action.mutate(self.api.as_ref(), &record).await {
            Ok(MutationOutcome::Accepted(user)) => {
                in_flight.advance(SubmissionPhase::Succeeded);
                info!(page, user_id = %user.id, "submission accepted");
                self.action.apply(&self.session, user.clone()).await;
                self.notifier
                    .notify(Notification::success(self.action.success_message()));
                SubmitReport::Saved(user)
            }
            Ok(MutationOutcome::Rejected { message }) => {
                in_flight.advance(SubmissionPhase::Failed);
                warn!(page, detail = ?message, "submission rejected");
                self.notifier
                    .notify(Notification::error(GENERIC_FAILURE_MESSAGE));
                SubmitReport::Failed(SubmitFailure::Rejected { message })
            }
            Err(error) => {
                in_flight.advance(SubmissionPhase::Failed);
                warn!(page, %error, "submission failed");
                let detail = error
                    .response_body()
                    .map_or_else(|| error.to_string(), str::to_string);
                self.notifier
                    .notify(Notification::error(format!("An error occurred: {detail}")));
                SubmitReport::Failed(SubmitFailure::Error(detail))
            }
        }
    }
}

impl<A: PageAction> FormPage<A> {
    /// Re-hydrates the form whenever the session user changes. The task ends
    /// once the page is dropped.
    pub fn watch_session(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.session.subscribe();
        let mut closed = self.closed.subscribe();
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    changed = closed.changed() => match changed {
                        Ok(()) => continue,
                        Err(_) => break,
                    },
                    event = events.recv() => event,
                };
                let Some(page) = weak.upgrade() else {
                    break;
                };
                match event {
                    Ok(SessionEvent::UserChanged(user)) => {
                        if let Some(defaults) = page.action.hydrate(Some(&user)) {
                            page.form.lock().await.reset(defaults);
                        }
                    }
                    Ok(SessionEvent::SignedOut) => {
                        if let Some(defaults) = page.action.hydrate(None) {
                            page.form.lock().await.reset(defaults);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "session watcher lagged; re-reading session");
                        page.hydrate_from_session().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
