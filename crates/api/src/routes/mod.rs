//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (database ping)
//!
//! # Auth
//! POST /api/register               - Register a new account
//! POST /api/login                  - Login, returns a bearer token
//! GET  /api/verify-email/{token}   - Redeem a verification token
//! POST /api/forgot-password        - Begin a password reset
//! POST /api/reset-password/{token} - Redeem a reset token
//!
//! # Account (requires bearer auth)
//! GET    /api/wishlist             - Wishlist resolved against the catalog
//! POST   /api/wishlist             - Add a product
//! DELETE /api/wishlist             - Remove a product
//! POST   /api/addresses            - Add an address (max 3)
//! PUT    /api/addresses/{index}    - Replace an address by position
//! DELETE /api/addresses/{index}    - Remove an address by position
//!
//! # Catalog
//! GET  /api/products               - Product listing
//! GET  /api/products/{id}          - Product detail
//! POST /api/products               - Create a product (admin)
//! POST /api/products/stock         - Decrement stock (admin)
//!
//! # Orders
//! POST   /api/orders               - Place an order (bearer auth)
//! GET    /api/orders               - List all orders (admin)
//! GET    /api/orders/{id}          - Order detail (owner or admin)
//! PUT    /api/orders/{id}          - Update status (admin)
//! DELETE /api/orders/{id}          - Delete an order (admin)
//!
//! # Reviews
//! GET    /api/reviews              - List reviews (public)
//! POST   /api/reviews              - Add a review (bearer auth)
//! PUT    /api/reviews/{id}         - Update own review
//! DELETE /api/reviews/{id}         - Delete own review
//! ```

pub mod account;
pub mod auth;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::state::AppState;

/// Confirmation payload for operations with no richer response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Build a confirmation message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify-email/{token}", get(auth::verify_email))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password/{token}", post(auth::reset_password))
}

/// Create the account routes router (wishlist + addresses).
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/wishlist",
            get(account::get_wishlist)
                .post(account::add_to_wishlist)
                .delete(account::remove_from_wishlist),
        )
        .route("/addresses", post(account::add_address))
        .route(
            "/addresses/{index}",
            put(account::update_address).delete(account::delete_address),
        )
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/stock", post(products::update_stock))
        .route("/{id}", get(products::get))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route(
            "/{id}",
            get(orders::get)
                .put(orders::update_status)
                .delete(orders::delete),
        )
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list).post(reviews::add))
        .route(
            "/{id}",
            put(reviews::update).delete(reviews::delete),
        )
}

/// Create the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(auth_routes())
            .merge(account_routes())
            .nest("/products", product_routes())
            .nest("/orders", order_routes())
            .nest("/reviews", review_routes()),
    )
}
