//! Session protocol tests against a mock moderation service: login, the
//! 401 recovery path, and the full-clear invariant on failed
//! re-authentication.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modwarden::credentials::{CredentialStore, InMemoryCredentialStore, StoredCredentials};
use modwarden::{ClientError, ReportClient, SessionError, SessionManager};

fn stored(token: &str) -> StoredCredentials {
    StoredCredentials {
        access_token: token.to_string(),
        user_id: "admin1".to_string(),
        password: "secret".to_string(),
    }
}

fn dashboard_body(total_pending: u64) -> serde_json::Value {
    json!({
        "stats": {
            "totalPending": total_pending,
            "totalAppealed": 1,
            "totalResolvedToday": 0,
            "totalBannedUsers": 0
        },
        "pendingReports": []
    })
}

#[tokio::test]
async fn login_stores_token_and_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_json(json!({"userId": "admin1", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    let session = SessionManager::new(&server.uri(), store.clone());

    session.login("admin1", "secret").await.unwrap();

    assert!(session.is_authenticated().await);
    assert_eq!(session.current_user().await.as_deref(), Some("admin1"));
    assert_eq!(store.load().unwrap(), Some(stored("tok-1")));
}

#[tokio::test]
async fn failed_login_leaves_existing_session_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_json(json!({"userId": "admin1", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_json(json!({"userId": "admin1", "password": "typo"})))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "bad credentials"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    let session = SessionManager::new(&server.uri(), store.clone());
    session.login("admin1", "secret").await.unwrap();

    let err = session.login("admin1", "typo").await.unwrap_err();
    assert_eq!(format!("{err}"), "invalid credentials: bad credentials");

    // The working session survives a failed re-login attempt.
    assert!(session.is_authenticated().await);
    assert_eq!(store.load().unwrap(), Some(stored("tok-1")));
}

#[tokio::test]
async fn expired_token_triggers_one_reauth_and_one_retry() {
    let server = MockServer::start().await;

    // The restored token is rejected once...
    Mock::given(method("GET"))
        .and(path("/api/reports/admin/dashboard"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    // ...one silent re-login with the stored credentials...
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_json(json!({"userId": "admin1", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-2"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    // ...and the verbatim request is replayed once with the fresh token.
    Mock::given(method("GET"))
        .and(path("/api/reports/admin/dashboard"))
        .and(header("Authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dashboard_body(3)))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    store.save(&stored("tok-1")).unwrap();

    let session = SessionManager::new(&server.uri(), store.clone());
    assert!(session.restore().await);

    let client = ReportClient::new(session.clone());
    let data = client.fetch_dashboard().await.unwrap();
    assert_eq!(data.stats.total_pending, 3);

    // Identity and credential untouched, only the token rotated.
    assert_eq!(store.load().unwrap(), Some(stored("tok-2")));
    assert_eq!(session.current_user().await.as_deref(), Some("admin1"));

    server.verify().await;
}

#[tokio::test]
async fn failed_reauth_clears_session_completely() {
    let server = MockServer::start().await;

    // No retry must follow a failed re-auth: exactly one dashboard call.
    Mock::given(method("GET"))
        .and(path("/api/reports/admin/dashboard"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    // The stored password has been rotated out server-side.
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "bad credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    store.save(&stored("tok-stale")).unwrap();

    let session = SessionManager::new(&server.uri(), store.clone());
    assert!(session.restore().await);

    let client = ReportClient::new(session.clone());
    let err = client.fetch_dashboard().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Session(SessionError::Expired)
    ));

    // Token, identity and credential all gone — never partially cleared.
    assert!(!session.is_authenticated().await);
    assert_eq!(session.current_user().await, None);
    assert_eq!(store.load().unwrap(), None);

    server.verify().await;
}

#[tokio::test]
async fn transport_failure_propagates_without_retry() {
    // Take the server's address, then shut it down.
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let store = Arc::new(InMemoryCredentialStore::new());
    store.save(&stored("tok-1")).unwrap();

    let session = SessionManager::new(&uri, store.clone());
    assert!(session.restore().await);

    let client = ReportClient::new(session.clone());
    let err = client.fetch_dashboard().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Session(SessionError::Transport(_))
    ));

    // A transport failure says nothing about the token; the session stays.
    assert!(session.is_authenticated().await);
    assert_eq!(store.load().unwrap(), Some(stored("tok-1")));
}

#[tokio::test]
async fn requests_without_a_session_fail_as_expired() {
    let server = MockServer::start().await;

    let store = Arc::new(InMemoryCredentialStore::new());
    let session = SessionManager::new(&server.uri(), store);
    assert!(!session.restore().await);

    let client = ReportClient::new(session);
    let err = client.fetch_dashboard().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Session(SessionError::Expired)
    ));
}

#[tokio::test]
async fn logout_is_idempotent_and_clears_storage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    let session = SessionManager::new(&server.uri(), store.clone());
    session.login("admin1", "secret").await.unwrap();

    session.logout().await;
    assert!(!session.is_authenticated().await);
    assert_eq!(store.load().unwrap(), None);

    // Logging out again is harmless.
    session.logout().await;
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn conflict_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reports/r1/admin-review"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({"message": "report already resolved"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    store.save(&stored("tok-1")).unwrap();
    let session = SessionManager::new(&server.uri(), store);
    session.restore().await;

    let client = ReportClient::new(session);
    let err = client
        .submit_review(
            "r1",
            modwarden::ReviewDecision::ResolvedValid,
            "",
            false,
        )
        .await
        .unwrap_err();

    match err {
        ClientError::Conflict { message } => assert_eq!(message, "report already resolved"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/admin/appeals"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::new());
    store.save(&stored("tok-1")).unwrap();
    let session = SessionManager::new(&server.uri(), store);
    session.restore().await;

    let client = ReportClient::new(session);
    let err = client.fetch_appeals().await.unwrap_err();
    assert_eq!(format!("{err}"), "database unavailable");
}
