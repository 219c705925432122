use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AccountApi, BroadcastNotifier, CompanyField, FormPage, FormRecord, GuardOutcome,
    HttpAccountApi, Notification, PageAction, SaveCompanyDetails, SessionContext, SessionGuard,
    Severity, SignUp, SignUpField, SubmitReport,
};
use shared::domain::{CompanyDetails, CreateUser};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_api_base_url, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(about = "Register an account and set up company billing details")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides `api_base_url` from the config file and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Bearer token of the signed-in user.
    #[arg(long)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    SignUp {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Fields left out keep the value already saved on the profile.
    SetupCompany {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        vat_number: Option<String>,
        #[arg(long)]
        reg_number: Option<String>,
        #[arg(long)]
        iban: Option<String>,
        #[arg(long)]
        swift: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(api_url) = args.api_url {
        settings.api_base_url = normalize_api_base_url(&api_url)?;
    }
    if let Some(token) = args.token {
        settings.bearer_token = Some(token);
    }
    info!(api = %settings.api_base_url, "starting company setup client");

    let session = SessionContext::new();
    if let Some(token) = settings.bearer_token.clone() {
        session.set_bearer_token(token).await;
    }
    let api: Arc<dyn AccountApi> =
        Arc::new(HttpAccountApi::new(settings.api_base_url.clone()).with_session(session.clone()));
    let notifier = Arc::new(BroadcastNotifier::default());
    let mut notifications = notifier.subscribe();

    match args.command {
        Command::SignUp {
            name,
            email,
            password,
            confirm_password,
        } => {
            let page = FormPage::open(SignUp, api, session, notifier).await;
            page.with_form(|form| {
                form.register(SignUpField::Name).set(name);
                form.register(SignUpField::Email).set(email);
                form.register(SignUpField::Password).set(password);
                form.register(SignUpField::ConfirmPassword).set(confirm_password);
            })
            .await;
            let report = page.submit().await;
            print_notifications(&mut notifications);
            finish::<CreateUser>(report)
        }
        Command::SetupCompany {
            name,
            address,
            vat_number,
            reg_number,
            iban,
            swift,
        } => {
            let token = session
                .bearer_token()
                .await
                .ok_or_else(|| anyhow!("setup-company needs --token or APP__BEARER_TOKEN"))?;
            let user = api
                .current_user()
                .await
                .context("failed to load the signed-in user")?;
            session.sign_in(user, Some(token)).await;

            let overrides = [
                (CompanyField::Name, name),
                (CompanyField::Address, address),
                (CompanyField::VatNumber, vat_number),
                (CompanyField::RegNumber, reg_number),
                (CompanyField::Iban, iban),
                (CompanyField::Swift, swift),
            ];
            let guard = SessionGuard::new(settings.sign_in_path.clone());
            let outcome = guard
                .with_auth(&session, |_user| {
                    run_page(SaveCompanyDetails, api, session.clone(), notifier, overrides)
                })
                .await;
            print_notifications(&mut notifications);
            match outcome {
                GuardOutcome::Render(report) => finish::<CompanyDetails>(report),
                GuardOutcome::Redirect { location } => {
                    bail!("not signed in; sign in at {location} first")
                }
            }
        }
    }
}

async fn run_page<A: PageAction>(
    action: A,
    api: Arc<dyn AccountApi>,
    session: SessionContext,
    notifier: Arc<BroadcastNotifier>,
    overrides: impl IntoIterator<Item = (<A::Record as FormRecord>::Field, Option<String>)>,
) -> SubmitReport<<A::Record as FormRecord>::Field> {
    let page = FormPage::open(action, api, session, notifier).await;
    page.with_form(|form| {
        for (field, value) in overrides {
            if let Some(value) = value {
                form.register(field).set(value);
            }
        }
    })
    .await;
    page.submit().await
}

fn print_notifications(notifications: &mut broadcast::Receiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        match notification.severity {
            Severity::Success => println!("{}", notification.message),
            Severity::Error => eprintln!("{}", notification.message),
        }
    }
}

fn finish<R: FormRecord>(report: SubmitReport<R::Field>) -> Result<()> {
    match report {
        SubmitReport::Saved(user) => {
            println!("Saved profile for {} <{}>", user.name, user.email);
            Ok(())
        }
        SubmitReport::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {}: {message}", R::field_name(field));
            }
            bail!("form has {} invalid field(s)", errors.len())
        }
        SubmitReport::Failed(failure) => bail!("submission failed: {failure:?}"),
        SubmitReport::Busy => bail!("a submission is already in progress"),
    }
}
