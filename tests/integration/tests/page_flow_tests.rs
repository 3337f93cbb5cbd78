//! Page flow tests against a live server
//!
//! Run with: cargo test -p integration-tests --test page_flow_tests

use integration_tests::{
    assert_json, assert_status, login_fields, RegisterForm, TestServer, TEST_PASSWORD,
};
use reqwest::StatusCode;
use serde_json::Value;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await.unwrap();

    let health: Value = assert_json(server.get("/health").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let ready: Value = assert_json(server.get("/health/ready").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(ready["status"], "ready");
}

// ============================================================================
// Account Tests
// ============================================================================

#[tokio::test]
async fn test_register_logout_login() {
    let server = TestServer::start().await.unwrap();
    let form = RegisterForm::unique();

    let page = server.page("/en/account/register").await.unwrap();
    let token = page["csrf_token"].as_str().unwrap().to_string();

    // The 303 is followed to the account page
    let response = server
        .post_form("/en/account/register", &form.fields(&token))
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/en/account");
    let index: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(index["account"]["username"], form.username.as_str());
    assert_eq!(index["flashes"][0]["message"], "Your account has been created.");

    let response = server.get("/en/account/logout").await.unwrap();
    assert_eq!(response.url().path(), "/en/");
    assert_status(response, StatusCode::OK).await.unwrap();

    let page = server.page("/en/account/login").await.unwrap();
    let token = page["csrf_token"].as_str().unwrap().to_string();
    let response = server
        .post_form(
            "/en/account/login",
            &login_fields(&form.email, TEST_PASSWORD, &token),
        )
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/en/account");
    let index: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(index["user"]["username"], form.username.as_str());
}

#[tokio::test]
async fn test_bad_credentials_are_generic() {
    let server = TestServer::start().await.unwrap();

    let page = server.page("/fr/account/login").await.unwrap();
    let token = page["csrf_token"].as_str().unwrap().to_string();
    let response = server
        .post_form(
            "/fr/account/login",
            &login_fields("nobody", TEST_PASSWORD, &token),
        )
        .await
        .unwrap();

    assert_eq!(response.url().path(), "/fr/account/login");
    let page: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page["error"], "Identifiants invalides.");
    assert_eq!(page["last_username"], "nobody");
}

#[tokio::test]
async fn test_protected_page_returns_after_login() {
    let server = TestServer::start().await.unwrap();
    let form = RegisterForm::unique();

    let page = server.page("/en/account/register").await.unwrap();
    let token = page["csrf_token"].as_str().unwrap().to_string();
    server
        .post_form("/en/account/register", &form.fields(&token))
        .await
        .unwrap();
    server.get("/en/account/logout").await.unwrap();

    let response = server.get("/en/account/edit").await.unwrap();
    assert_eq!(response.url().path(), "/en/account/login");
    let page: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page["flashes"][0]["message"], "Please login to continue.");

    let token = page["csrf_token"].as_str().unwrap().to_string();
    let response = server
        .post_form(
            "/en/account/login",
            &login_fields(&form.username, TEST_PASSWORD, &token),
        )
        .await
        .unwrap();
    assert_eq!(response.url().path(), "/en/account/edit");
}

#[tokio::test]
async fn test_unsupported_locale() {
    let server = TestServer::start().await.unwrap();
    assert_status(server.get("/xx/").await.unwrap(), StatusCode::NOT_FOUND)
        .await
        .unwrap();
}
