use httpmock::prelude::*;
use rolefit_client::api::auth::Credentials;
use rolefit_client::{ApiClient, AuthGuard, AuthState, FileTokenStore, Navigation, RouteName, TokenStore};
use rolefit_devkit::{Fixtures, TestHarness};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_login_stores_token_used_by_next_request() {
    let harness = TestHarness::new();
    let login = harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/auth/login")
            .json_body(json!({"username": "admin", "password": "s3cret"}));
        then.status(200).json_body(Fixtures::token_response("jwt-1"));
    });
    let me = harness.backend.server().mock(|when, then| {
        when.method(GET).path("/api/auth/me").header("authorization", "Bearer jwt-1");
        then.status(200).json_body(Fixtures::user("admin"));
    });

    assert_eq!(harness.guard().check(RouteName::Settings), Navigation::Redirect(RouteName::Login));

    let session = harness
        .client
        .auth()
        .login(&Credentials::new("admin", "s3cret"))
        .await
        .unwrap();
    assert_eq!(session.token_type, "bearer");
    assert_eq!(session.expires_in, Some(1800));
    assert_eq!(harness.backend.tokens().load().unwrap().as_deref(), Some("jwt-1"));

    let user = harness.client.auth().me().await.unwrap();
    assert_eq!(user.role, "admin");
    login.assert();
    me.assert();

    assert_eq!(harness.guard().check(RouteName::Login), Navigation::Redirect(RouteName::Dashboard));
}

#[tokio::test]
async fn test_failed_login_keeps_store_empty() {
    let harness = TestHarness::new();
    harness.backend.fail(POST, "auth/login", 401, "Incorrect username or password");

    let err = harness
        .client
        .auth()
        .login(&Credentials::new("admin", "wrong"))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.backend_message(), Some("Incorrect username or password"));
    assert!(!harness.has_session());
}

#[tokio::test]
async fn test_unauthorized_clears_session_once() {
    let harness = TestHarness::logged_in("expired");
    harness.backend.fail(GET, "devices", 401, "Token expired");

    let err = harness.client.devices().list(&Default::default()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(harness.session_clears(), 1);
    assert!(!harness.has_session());
    assert_eq!(harness.guard().check(RouteName::DeviceList), Navigation::Redirect(RouteName::Login));
}

#[tokio::test]
async fn test_concurrent_unauthorized_responses_are_harmless() {
    let harness = TestHarness::logged_in("expired");
    harness.backend.fail(GET, "devices", 401, "Token expired");
    harness.backend.fail(GET, "tasks", 401, "Token expired");

    let device_params = Default::default();
    let task_params = Default::default();
    let devices = harness.client.devices();
    let tasks = harness.client.tasks();
    let (a, b) = tokio::join!(devices.list(&device_params), tasks.list(&task_params));

    assert!(a.unwrap_err().is_unauthorized());
    assert!(b.unwrap_err().is_unauthorized());
    assert_eq!(harness.session_clears(), 2);
    assert!(!harness.has_session());
}

#[tokio::test]
async fn test_logout_clears_even_when_backend_fails() {
    let harness = TestHarness::logged_in("jwt-1");
    let mock = harness.backend.fail(POST, "auth/logout", 500, "boom");

    harness.client.auth().logout().await.unwrap();
    harness.expect_calls(&mock, 1).unwrap();
    assert!(!harness.has_session());

    // Second logout with nothing stored is still fine.
    harness.client.auth().logout().await.unwrap();
}

#[tokio::test]
async fn test_refresh_replaces_token() {
    let harness = TestHarness::logged_in("old");
    harness.backend.server().mock(|when, then| {
        when.method(POST)
            .path("/api/auth/refresh")
            .json_body(json!({"refresh_token": "refresh-xyz"}));
        then.status(200).json_body(Fixtures::token_response("new"));
    });

    harness.client.auth().refresh("refresh-xyz").await.unwrap();
    assert_eq!(harness.backend.tokens().load().unwrap().as_deref(), Some("new"));
}

#[tokio::test]
async fn test_login_recovers_from_corrupt_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.toml");
    std::fs::write(&path, "token = \n garbage [[").unwrap();
    let store = Arc::new(FileTokenStore::new(&path));

    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/api/auth/login").header_missing("authorization");
        then.status(200).json_body(Fixtures::token_response("jwt-fresh"));
    });

    let client = ApiClient::new(&server.url("/api"), store.clone()).unwrap();
    assert_eq!(AuthGuard::new(store.clone()).state(), AuthState::Unauthenticated);

    client
        .auth()
        .login(&Credentials::new("admin", "s3cret"))
        .await
        .unwrap();

    login.assert();
    assert_eq!(store.load().unwrap().as_deref(), Some("jwt-fresh"));
    assert_eq!(AuthGuard::new(store).state(), AuthState::Authenticated);
}
