//! Client core for account sign-up and company billing details: form validation,
//! submission orchestration, the account API client, and the shared session.

pub mod api;
pub mod form;
pub mod guard;
pub mod notify;
pub mod page;
pub mod session;
pub mod validation;

pub use api::{AccountApi, HttpAccountApi, MutationError, MutationOutcome};
pub use form::{FieldBinding, FieldErrors, Form, FormRecord, Validated, Validation};
pub use guard::{with_auth, GuardOutcome, SessionGuard};
pub use notify::{BroadcastNotifier, Notification, Notifier, Severity, TracingNotifier};
pub use page::{
    CompanySetupPage, FormPage, PageAction, SaveCompanyDetails, SignUp, SignUpPage,
    SubmissionMachine, SubmissionPhase, SubmitFailure, SubmitReport,
};
pub use session::{SessionContext, SessionEvent, SessionSnapshot};
pub use validation::{validate_company_details, validate_sign_up, CompanyField, SignUpField};
