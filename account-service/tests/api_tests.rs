mod common;

use account_service::account::models::AccountStatus;
use account_service::account::models::PublicId;
use account_service::account::verification::TokenValue;
use auth::Claims;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use common::PASSWORD;
use reqwest::header::LOCATION;
use reqwest::header::SET_COOKIE;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

async fn body(response: reqwest::Response) -> Value {
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
async fn test_signup_success() {
    let app = TestApp::spawn().await;

    let response = app.signup("Alice", "alice@example.com").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[LOCATION], "/api/v1/users/me");

    let body = body(response).await;
    assert_eq!(body["success"], true);
    assert!(body["timestamp"].is_i64());
    assert!(body.get("errorCode").is_none());

    let emails = app.emails.sent_to("alice@example.com");
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].template_name, "mail/verify");
    assert_eq!(emails[0].subject, "Please verify your email address");
    assert_eq!(emails[0].variables["name"], "Alice");
    assert!(emails[0].variables["link"].starts_with("http://localhost:3000/auth/verify-email?token="));
    assert!(TokenValue::parse(&emails[0].token()).is_ok());
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = TestApp::spawn().await;

    app.signup("Alice", "alice@example.com").await;
    let response = app.signup("Alice Again", "alice@example.com").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "DUPLICATE_EMAIL");
    assert_eq!(app.emails.sent_to("alice@example.com").len(), 1);
}

#[tokio::test]
async fn test_signup_reports_every_invalid_field() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/v1/auth/signup")
        .json(&json!({
            "name": " ",
            "email": "not-an-email",
            "password": "password",
            "phoneNumber": "010-1234"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body(response).await;
    assert_eq!(body["errorCode"], "INVALID_INPUT");
    let fields: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password", "phoneNumber"]);
    assert!(app.emails.sent().is_empty());
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/v1/auth/login")
        .header("Content-Type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(response).await["errorCode"], "INVALID_JSON");
}

#[tokio::test]
async fn test_login_requires_verified_email() {
    let app = TestApp::spawn().await;
    app.signup("Alice", "alice@example.com").await;

    let response = app.login("alice@example.com", PASSWORD, "mobile").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(response).await["errorCode"], "ACCOUNT_DISABLED");

    let token = app.emails.last_to("alice@example.com").token();
    let response = app.verify(&token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.login("alice@example.com", PASSWORD, "mobile").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body(response).await;
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(!body["data"]["accessToken"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let app = TestApp::spawn().await;
    app.active_account("Alice", "alice@example.com").await;

    let wrong_password = app.login("alice@example.com", "Wrong1!pw", "mobile").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(wrong_password).await["errorCode"], "BAD_CREDENTIALS");

    let unknown = app.login("nobody@example.com", PASSWORD, "mobile").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(unknown).await["errorCode"], "BAD_CREDENTIALS");
}

#[tokio::test]
async fn test_login_banned_account_is_locked() {
    let app = TestApp::spawn().await;
    app.active_account("Alice", "alice@example.com").await;
    app.set_status("alice@example.com", AccountStatus::Banned).await;

    let response = app.login("alice@example.com", PASSWORD, "mobile").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(response).await["errorCode"], "ACCOUNT_LOCKED");
}

#[tokio::test]
async fn test_web_login_sets_cookie_and_hides_token() {
    let app = TestApp::spawn().await;
    app.active_account("Alice", "alice@example.com").await;

    let response = app.login("alice@example.com", PASSWORD, "WEB").await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("accessToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=1800"));

    let body = body(response).await;
    assert!(body["data"].get("accessToken").is_none());
    assert_eq!(body["data"]["email"], "alice@example.com");

    // The client's cookie store now carries the token.
    let me = app.get("/api/v1/users/me").send().await.unwrap();
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_defaults_to_web_delivery() {
    let app = TestApp::spawn().await;
    app.active_account("Alice", "alice@example.com").await;

    let response = app
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();

    assert!(response.headers().contains_key(SET_COOKIE));
    assert!(body(response).await["data"].get("accessToken").is_none());
}

#[tokio::test]
async fn test_current_account_with_bearer_token() {
    let app = TestApp::spawn().await;
    let token = app.active_account("Alice", "alice@example.com").await;

    let response = app
        .get_authenticated("/api/v1/users/me", &token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body(response).await;
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["status"], "ACTIVE");
    assert_eq!(body["data"]["role"], "USER");
    assert!(PublicId::from_string(body["data"]["publicId"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_current_account_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/v1/users/me").send().await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(response).await["errorCode"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_expired_and_invalid_access_tokens() {
    let app = TestApp::spawn().await;

    let expired = Claims::issued_at(
        PublicId::new(),
        "alice@example.com",
        "ROLE_USER",
        Utc::now() - Duration::hours(2),
        Duration::minutes(30),
    );
    let expired = app.token_codec.encode(&expired).unwrap();

    let response = app
        .get_authenticated("/api/v1/users/me", &expired)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(response).await["errorCode"], "TOKEN_EXPIRED");

    let response = app
        .get_authenticated("/api/v1/users/me", "not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(response).await["errorCode"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::spawn().await;
    app.active_account("Alice", "alice@example.com").await;
    app.login("alice@example.com", PASSWORD, "web").await;

    let response = app.post("/api/v1/auth/logout").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("accessToken=;"));
    assert!(cookie.contains("Max-Age=0"));

    let me = app.get("/api/v1/users/me").send().await.unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_email_token_errors() {
    let app = TestApp::spawn().await;
    app.signup("Alice", "alice@example.com").await;
    let token = app.emails.last_to("alice@example.com").token();

    assert_eq!(app.verify(&token).await.status(), StatusCode::OK);

    let reused = app.verify(&token).await;
    assert_eq!(reused.status(), StatusCode::GONE);
    assert_eq!(body(reused).await["errorCode"], "VERIFICATION_TOKEN_ALREADY_USED");

    let unknown = app.verify(&TokenValue::generate().to_string()).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(unknown).await["errorCode"], "VERIFICATION_TOKEN_NOT_FOUND");

    let malformed = app.verify("definitely-not-a-uuid").await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    let malformed = body(malformed).await;
    assert_eq!(malformed["errorCode"], "INVALID_INPUT");
    assert_eq!(malformed["data"][0]["field"], "token");
}

#[tokio::test]
async fn test_concurrent_verification_succeeds_once() {
    let app = TestApp::spawn().await;
    app.signup("Alice", "alice@example.com").await;
    let token = app.emails.last_to("alice@example.com").token();

    let (first, second) = tokio::join!(app.verify(&token), app.verify(&token));
    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();

    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::GONE]);
}

#[tokio::test]
async fn test_resend_after_expiry() {
    let app = TestApp::spawn().await;
    app.signup("Alice", "alice@example.com").await;
    let expired = app.emails.last_to("alice@example.com").token();
    let expired_value = TokenValue::parse(&expired).unwrap();
    assert!(
        app.store
            .set_token_expiry(&expired_value, Utc::now() - Duration::minutes(1))
            .await
    );

    let response = app.verify(&expired).await;
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(body(response).await["errorCode"], "VERIFICATION_TOKEN_EXPIRED");

    let response = app
        .post("/api/v1/auth/verify-email/resend")
        .json(&json!({ "expiredToken": expired }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let emails = app.emails.sent_to("alice@example.com");
    assert_eq!(emails.len(), 2);
    let replacement = emails[1].token();
    assert_ne!(replacement, expired);

    // The expired token row is gone.
    assert_eq!(app.verify(&expired).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.verify(&replacement).await.status(), StatusCode::OK);
    assert_eq!(
        app.login("alice@example.com", PASSWORD, "mobile").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::spawn().await;
    app.active_account("Alice", "alice@example.com").await;

    let response = app
        .post("/api/v1/auth/password/reset-request")
        .json(&json!({ "email": "alice@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let email = app.emails.last_to("alice@example.com");
    assert_eq!(email.subject, "Reset your password");
    assert!(email.variables["link"].starts_with("http://localhost:3000/auth/password/reset?token="));

    let response = app
        .post("/api/v1/auth/password/reset")
        .json(&json!({ "token": email.token(), "newPassword": "NewPassword1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        app.login("alice@example.com", "NewPassword1!", "mobile").await.status(),
        StatusCode::OK
    );
    assert_eq!(
        app.login("alice@example.com", PASSWORD, "mobile").await.status(),
        StatusCode::UNAUTHORIZED
    );

    // A consumed reset token cannot be replayed.
    let reused = app
        .post("/api/v1/auth/password/reset")
        .json(&json!({ "token": email.token(), "newPassword": "Another1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(reused.status(), StatusCode::GONE);
}

#[tokio::test]
async fn test_password_reset_request_on_banned_account() {
    let app = TestApp::spawn().await;
    app.active_account("Alice", "alice@example.com").await;
    app.set_status("alice@example.com", AccountStatus::Banned).await;
    let emails_before = app.emails.sent().len();

    let response = app
        .post("/api/v1/auth/password/reset-request")
        .json(&json!({ "email": "alice@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body(response).await["errorCode"], "ACCOUNT_LOCKED");
    assert_eq!(app.emails.sent().len(), emails_before);
}

#[tokio::test]
async fn test_password_reset_request_unknown_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/v1/auth/password/reset-request")
        .json(&json!({ "email": "nobody@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(response).await["errorCode"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/v1/nothing-here").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(response).await["errorCode"], "NOT_FOUND");

    let response = app.get("/api/v1/auth/login").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body(response).await["errorCode"], "METHOD_NOT_ALLOWED");
}
