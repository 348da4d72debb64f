use super::*;
use crate::forms::MSG_PASSWORD_MISMATCH;
use crate::http::MockHttpClient;
use crate::storage::MemoryStore;
use serde_json::json;

const BASE: &str = "http://api.test";

fn setup() -> (MockHttpClient, MemoryStore, AuthClient<MockHttpClient, MemoryStore>) {
    let http = MockHttpClient::new();
    let store = MemoryStore::new();
    let client = AuthClient::new(http.clone(), store.clone(), "http://api.test/");
    (http, store, client)
}

fn user_json(role: &str) -> serde_json::Value {
    json!({"id": "u-1", "email": "admin@testops.com", "username": "admin", "role": role})
}

fn login_form() -> LoginForm {
    LoginForm {
        email: "admin@testops.com".into(),
        password: "admin123".into(),
    }
}

#[tokio::test]
async fn login_stores_token_and_returns_session() {
    let (http, store, client) = setup();
    http.mock_response(
        &format!("{BASE}/api/auth/login"),
        200,
        json!({"success": true, "message": "Login successful",
               "data": {"token": "jwt-1", "user": user_json("admin")}}),
    );

    let session = client.login(&login_form()).await.unwrap();
    assert_eq!(session.token, "jwt-1");
    assert_eq!(session.user.role, Role::Admin);
    assert_eq!(store.get(STORAGE_AUTH_TOKEN).as_deref(), Some("jwt-1"));

    let sent = http.requests();
    assert_eq!(sent[0].method, HttpMethod::Post);
    let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"email": "admin@testops.com", "password": "admin123"}));
}

#[tokio::test]
async fn invalid_login_stores_nothing() {
    let (http, store, client) = setup();
    http.mock_response(
        &format!("{BASE}/api/auth/login"),
        401,
        json!({"success": false, "message": "invalid email or password"}),
    );

    let err = client.login(&login_form()).await.unwrap_err();
    assert_eq!(err.message(), "invalid email or password");
    assert!(!store.contains(STORAGE_AUTH_TOKEN));
}

#[tokio::test]
async fn login_without_server_message_uses_default() {
    let (http, _, client) = setup();
    http.mock_response(&format!("{BASE}/api/auth/login"), 200, json!({"success": false}));

    let err = client.login(&login_form()).await.unwrap_err();
    assert_eq!(err.message(), MSG_LOGIN_REJECTED);
}

#[tokio::test]
async fn unreachable_server_reports_connection_failure() {
    let (http, _, client) = setup();
    http.set_unreachable(true);

    let err = client.login(&login_form()).await.unwrap_err();
    assert_eq!(err.message(), MSG_CONNECT_FAILED_RETRY);
}

#[tokio::test]
async fn signup_mismatch_never_hits_network() {
    let (http, _, client) = setup();
    let form = SignupForm {
        name: "jane".into(),
        email: "jane@test.com".into(),
        password: "secret1".into(),
        confirm_password: "secret2".into(),
        accept_terms: true,
    };

    let err = client.signup(&form).await.unwrap_err();
    assert_eq!(err.message(), MSG_PASSWORD_MISMATCH);
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn signup_success_does_not_log_in() {
    let (http, store, client) = setup();
    http.mock_response(
        &format!("{BASE}/api/users/signup"),
        201,
        json!({"success": true, "message": "User created successfully",
               "data": {"token": "jwt-2", "user": user_json("tester")}}),
    );
    let form = SignupForm {
        name: "jane".into(),
        email: "jane@test.com".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        accept_terms: true,
    };

    client.signup(&form).await.unwrap();
    assert!(!store.contains(STORAGE_AUTH_TOKEN));
}

#[tokio::test]
async fn signup_conflict_surfaces_server_message() {
    let (http, _, client) = setup();
    http.mock_response(
        &format!("{BASE}/api/users/signup"),
        400,
        json!({"success": false, "message": "email already registered"}),
    );
    let form = SignupForm {
        name: "jane".into(),
        email: "test@example.com".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        accept_terms: true,
    };

    let err = client.signup(&form).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Rejected {
            status: 400,
            message: "email already registered".into()
        }
    );
}

#[tokio::test]
async fn restore_keeps_valid_token() {
    let (http, store, client) = setup();
    store.set(STORAGE_AUTH_TOKEN, "jwt-3");
    http.mock_response(
        &format!("{BASE}/api/auth/me"),
        200,
        json!({"success": true, "data": user_json("tester")}),
    );

    let state = client.restore().await;
    assert!(state.is_authenticated());
    assert_eq!(state.role(), Some(Role::Tester));

    let sent = http.requests();
    assert_eq!(sent[0].method, HttpMethod::Get);
    assert_eq!(sent[0].body, None);
    assert_eq!(
        sent[0].headers.get(HEADER_AUTHORIZATION).map(String::as_str),
        Some("Bearer jwt-3")
    );
}

#[tokio::test]
async fn restore_drops_rejected_token() {
    let (http, store, client) = setup();
    store.set(STORAGE_AUTH_TOKEN, "stale");
    http.mock_response(
        &format!("{BASE}/api/auth/me"),
        401,
        json!({"success": false, "message": "Invalid or expired token"}),
    );

    assert_eq!(client.restore().await, SessionState::Anonymous);
    assert!(!store.contains(STORAGE_AUTH_TOKEN));
}

#[tokio::test]
async fn restore_without_token_skips_network() {
    let (http, _, client) = setup();
    assert_eq!(client.restore().await, SessionState::Anonymous);
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn unauthorized_response_forces_logout() {
    let (http, store, client) = setup();
    store.set(STORAGE_AUTH_TOKEN, "jwt-4");
    store.set(STORAGE_USER_PROFILE, "{}");
    http.mock_response(&format!("{BASE}/api/tests"), 401, json!({"success": false}));

    let err = client
        .authorized(HttpRequest::get(&client.url("/api/tests")))
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::SessionExpired);
    assert!(!store.contains(STORAGE_AUTH_TOKEN));
    assert!(!store.contains(STORAGE_USER_PROFILE));
}

#[tokio::test]
async fn authorized_attaches_bearer_and_content_type() {
    let (http, store, client) = setup();
    store.set(STORAGE_AUTH_TOKEN, "jwt-5");
    http.mock_response(&format!("{BASE}/api/tests"), 200, json!({"success": true}));

    let resp = client
        .authorized(HttpRequest::get(&client.url("/api/tests")))
        .await
        .unwrap();
    assert!(resp.ok());

    let sent = &http.requests()[0];
    assert_eq!(
        sent.headers.get(HEADER_AUTHORIZATION).map(String::as_str),
        Some("Bearer jwt-5")
    );
    assert_eq!(
        sent.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
}

#[tokio::test]
async fn google_login_requires_password_before_token() {
    let (http, store, client) = setup();
    http.mock_response(
        &format!("{BASE}/api/auth/google/login"),
        200,
        json!({"success": true, "data": {"requiresPassword": true, "user": user_json("tester")}}),
    );
    http.mock_response(
        &format!("{BASE}/api/auth/google/verify-password"),
        200,
        json!({"success": true, "message": "Google login successful",
               "data": {"token": "jwt-6", "user": user_json("tester")}}),
    );

    let GoogleOutcome::NeedsPassword(pending) = client.google_login("cred").await.unwrap() else {
        panic!("expected password step");
    };
    assert_eq!(pending.mode, GooglePasswordMode::VerifyPassword);
    assert_eq!(pending.token, None);
    assert!(!store.contains(STORAGE_AUTH_TOKEN));

    let form = GooglePasswordForm {
        password: "secret1".into(),
        confirm_password: "secret1".into(),
    };
    let session = client.complete_google_password(&pending, &form).await.unwrap();
    assert_eq!(session.token, "jwt-6");
    assert_eq!(store.get(STORAGE_AUTH_TOKEN).as_deref(), Some("jwt-6"));
}

#[tokio::test]
async fn google_login_unknown_account_is_rejected() {
    let (http, store, client) = setup();
    http.mock_response(
        &format!("{BASE}/api/auth/google/login"),
        404,
        json!({"success": false,
               "message": "No account found with this Google email. Please sign up first."}),
    );

    let err = client.google_login("cred").await.unwrap_err();
    assert_eq!(
        err.message(),
        "No account found with this Google email. Please sign up first."
    );
    assert!(!store.contains(STORAGE_AUTH_TOKEN));
}

#[tokio::test]
async fn google_signup_commits_token_only_after_password_set() {
    let (http, store, client) = setup();
    http.mock_response(
        &format!("{BASE}/api/auth/google/signup"),
        200,
        json!({"success": true,
               "data": {"token": "jwt-7", "needsPassword": true, "user": user_json("tester")}}),
    );
    http.mock_response(
        &format!("{BASE}/api/users/set-password"),
        200,
        json!({"success": true, "message": "Password set successfully"}),
    );

    let GoogleOutcome::NeedsPassword(pending) = client.google_signup("cred").await.unwrap() else {
        panic!("expected password step");
    };
    assert_eq!(pending.mode, GooglePasswordMode::SetPassword);
    assert!(!store.contains(STORAGE_AUTH_TOKEN));

    let short = GooglePasswordForm {
        password: "abc".into(),
        confirm_password: "abc".into(),
    };
    assert!(matches!(
        client.complete_google_password(&pending, &short).await,
        Err(ClientError::Invalid(_))
    ));
    assert_eq!(http.request_count(), 1);

    let form = GooglePasswordForm {
        password: "secret1".into(),
        confirm_password: "secret1".into(),
    };
    let session = client.complete_google_password(&pending, &form).await.unwrap();
    assert_eq!(session.token, "jwt-7");
    assert_eq!(store.get(STORAGE_AUTH_TOKEN).as_deref(), Some("jwt-7"));

    let set_req = &http.requests()[1];
    assert_eq!(
        set_req.headers.get(HEADER_AUTHORIZATION).map(String::as_str),
        Some("Bearer jwt-7")
    );
}

#[tokio::test]
async fn logout_clears_token_and_profile() {
    let (_, store, client) = setup();
    store.set(STORAGE_AUTH_TOKEN, "jwt");
    store.set(STORAGE_USER_PROFILE, "{}");
    client.logout();
    assert!(!store.contains(STORAGE_AUTH_TOKEN));
    assert!(!store.contains(STORAGE_USER_PROFILE));
}
