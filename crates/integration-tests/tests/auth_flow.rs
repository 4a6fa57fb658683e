//! Integration tests for the authentication lifecycle.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p skin-affairs-api)
//! - SMTP configuration pointing at a dev mailbox (deliveries are
//!   best-effort, so a black-hole relay is fine)
//!
//! Run with: cargo test -p skin-affairs-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use skin_affairs_integration_tests::{api_base_url, test_client, unique_email};

/// Test helper: register an account and return the response.
async fn register(client: &reqwest::Client, email: &str, password: &str) -> reqwest::Response {
    let base_url = api_base_url();
    client
        .post(format!("{base_url}/api/register"))
        .json(&json!({
            "first_name": "Test",
            "last_name": "Customer",
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to send register request")
}

/// Test helper: attempt a login and return the response.
async fn login(client: &reqwest::Client, email: &str, password: &str) -> reqwest::Response {
    let base_url = api_base_url();
    client
        .post(format!("{base_url}/api/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health() {
    let client = test_client();
    let resp = client
        .get(format!("{}/health", api_base_url()))
        .send()
        .await
        .expect("Failed to reach health endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_readiness() {
    let client = test_client();
    let resp = client
        .get(format!("{}/health/ready", api_base_url()))
        .send()
        .await
        .expect("Failed to reach readiness endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_then_duplicate_conflicts() {
    let client = test_client();
    let email = unique_email();

    let resp = register(&client, &email, "secret1").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same email again must conflict with a 400
    let resp = register(&client, &email, "secret1").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_normalizes_email_case() {
    let client = test_client();
    let email = unique_email();

    let resp = register(&client, &email, "secret1").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // A different spelling of the same address is still a duplicate
    let resp = register(&client, &email.to_uppercase(), "secret1").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_blank_fields_rejected() {
    let client = test_client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/register"))
        .json(&json!({
            "first_name": "   ",
            "last_name": "Customer",
            "email": unique_email(),
            "password": "secret1",
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_before_verification_is_forbidden() {
    let client = test_client();
    let email = unique_email();

    let resp = register(&client, &email, "secret1").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Correct password, unverified account: 403, never 401
    let resp = login(&client, &email, "secret1").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_wrong_password_matches_unknown_account() {
    let client = test_client();
    let email = unique_email();

    let resp = register(&client, &email, "secret1").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Wrong password and nonexistent account must be indistinguishable
    let wrong_password = login(&client, &email, "not-the-password").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_account = login(&client, &unique_email(), "secret1").await;
    assert_eq!(unknown_account.status(), StatusCode::UNAUTHORIZED);

    let wrong_body: Value = wrong_password.json().await.expect("JSON body");
    let unknown_body: Value = unknown_account.json().await.expect("JSON body");
    assert_eq!(wrong_body, unknown_body);
}

// ============================================================================
// Password reset
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_forgot_password_unknown_email_is_404() {
    let client = test_client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/forgot-password"))
        .json(&json!({ "email": unique_email() }))
        .send()
        .await
        .expect("Failed to send forgot-password request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_reset_password_with_garbage_token_is_400() {
    let client = test_client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/reset-password/not-a-real-token"))
        .json(&json!({ "password": "new-secret" }))
        .send()
        .await
        .expect("Failed to send reset-password request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Verification tokens
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_verify_email_with_garbage_token_is_400() {
    let client = test_client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/verify-email/not-a-real-token"))
        .send()
        .await
        .expect("Failed to send verify-email request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Access guard
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wishlist_requires_bearer_token() {
    let client = test_client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/wishlist"))
        .send()
        .await
        .expect("Failed to send wishlist request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wishlist_rejects_malformed_bearer_token() {
    let client = test_client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/wishlist"))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .expect("Failed to send wishlist request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_addresses_require_bearer_token() {
    let client = test_client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/addresses"))
        .json(&json!({
            "street": "1 Main St",
            "city": "Lagos",
            "state": "LA",
            "postal_code": "100001",
            "country": "NG",
        }))
        .send()
        .await
        .expect("Failed to send address request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
