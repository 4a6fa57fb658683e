//! Integration tests for the Skin Affairs backend.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! sqlx migrate run --source crates/api/migrations
//!
//! # Start the API
//! cargo run -p skin-affairs-api
//!
//! # Run integration tests
//! cargo test -p skin-affairs-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running server over HTTP; the base URL is configurable
//! via `API_BASE_URL` (default `http://localhost:5000`).

use reqwest::Client;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Create an HTTP client for test requests.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn test_client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Generate a unique test email so repeated runs never collide.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@test.skinaffairs.shop", uuid::Uuid::new_v4().simple())
}
