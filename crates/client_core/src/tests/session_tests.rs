use shared::domain::{CompanyDetails, CompanyDetailsRecord, UserId};

use super::*;

fn user(id: &str, company: Option<&str>) -> User {
    User {
        id: UserId(id.into()),
        name: "Jo".into(),
        email: "jo@toptal.com".into(),
        company_details: company.map(|name| CompanyDetailsRecord {
            data: CompanyDetails {
                name: name.into(),
                ..CompanyDetails::default()
            },
        }),
    }
}

#[tokio::test]
async fn new_session_is_anonymous() {
    let session = SessionContext::new();
    let snapshot = session.snapshot().await;
    assert!(snapshot.user.is_none());
    assert_eq!(snapshot.revision, 0);
    assert!(snapshot.updated_at.is_none());
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn sign_up_replaces_user_and_bumps_revision_once() {
    let session = SessionContext::new();
    let mut events = session.subscribe();

    session.apply_sign_up(user("u-1", None)).await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.user, Some(user("u-1", None)));
    assert_eq!(snapshot.revision, 1);
    assert!(snapshot.updated_at.is_some());
    assert_eq!(
        events.try_recv().expect("event"),
        SessionEvent::UserChanged(user("u-1", None))
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn persisting_company_details_replaces_only_that_sub_object() {
    let session = SessionContext::new();
    session.sign_in(user("u-1", Some("Old Co")), Some("token".into())).await;

    let mut returned = user("server-copy", Some("Toptal"));
    returned.name = "Renamed".into();
    session.persist_user_company_details(returned).await;

    let current = session.current_user().await.expect("signed in");
    assert_eq!(current.id, UserId("u-1".into()));
    assert_eq!(current.name, "Jo");
    assert_eq!(
        current.company_details().map(|details| details.name.as_str()),
        Some("Toptal")
    );
    assert_eq!(session.bearer_token().await.as_deref(), Some("token"));
    assert_eq!(session.revision().await, 2);
}

#[tokio::test]
async fn last_write_wins_for_company_details() {
    let session = SessionContext::new();
    session.sign_in(user("u-1", None), None).await;
    session.persist_user_company_details(user("u-1", Some("First"))).await;
    session.persist_user_company_details(user("u-1", Some("Second"))).await;
    let current = session.current_user().await.expect("signed in");
    assert_eq!(
        current.company_details().map(|details| details.name.as_str()),
        Some("Second")
    );
}

#[tokio::test]
async fn persisting_without_session_adopts_returned_user() {
    let session = SessionContext::new();
    session.persist_user_company_details(user("u-9", Some("Toptal"))).await;
    assert_eq!(session.current_user().await, Some(user("u-9", Some("Toptal"))));
}

#[tokio::test]
async fn sign_out_clears_user_and_token() {
    let session = SessionContext::new();
    session.sign_in(user("u-1", None), Some("token".into())).await;
    let mut events = session.subscribe();
    session.sign_out().await;
    assert!(!session.is_authenticated().await);
    assert!(session.bearer_token().await.is_none());
    assert_eq!(events.try_recv().expect("event"), SessionEvent::SignedOut);
}

#[tokio::test]
async fn clones_share_state() {
    let session = SessionContext::new();
    let other = session.clone();
    other.sign_in(user("u-1", None), None).await;
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn setting_bearer_token_leaves_user_and_revision_alone() {
    let session = SessionContext::new();
    let mut events = session.subscribe();
    session.set_bearer_token("token").await;
    assert_eq!(session.bearer_token().await.as_deref(), Some("token"));
    assert!(!session.is_authenticated().await);
    assert_eq!(session.revision().await, 0);
    assert!(events.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_publish_events_in_revision_order() {
    let session = SessionContext::new();
    session.sign_in(user("u-1", None), None).await;
    let mut events = session.subscribe();

    let writers: Vec<_> = (0..32)
        .map(|index| {
            let session = session.clone();
            tokio::spawn(async move {
                let name = format!("Co {index}");
                session
                    .persist_user_company_details(user("u-1", Some(name.as_str())))
                    .await;
            })
        })
        .collect();
    for writer in writers {
        writer.await.expect("writer task");
    }

    let mut last = None;
    let mut received = 0;
    while let Ok(event) = events.try_recv() {
        received += 1;
        last = Some(event);
    }
    assert_eq!(received, 32);
    let current = session.current_user().await.expect("signed in");
    assert_eq!(last, Some(SessionEvent::UserChanged(current)));
    assert_eq!(session.revision().await, 33);
}
