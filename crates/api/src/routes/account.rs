//! Account route handlers: wishlist and addresses.
//!
//! Every handler here sits behind the bearer-token guard; the resolved
//! account arrives through the [`CurrentUser`] extractor.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use skin_affairs_core::ProductId;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{Address, Product};
use crate::services::auth::AuthService;
use crate::state::AppState;

use super::MessageResponse;

/// Wishlist add/remove request body.
#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

/// Address list response.
#[derive(Debug, Serialize)]
pub struct AddressListResponse {
    pub addresses: Vec<Address>,
}

// ============================================================================
// Wishlist
// ============================================================================

/// Resolve the account's wishlist against the catalog.
///
/// GET /api/wishlist
///
/// # Errors
///
/// Returns 401 without a valid bearer token.
pub async fn get_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Product>>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    let products = auth.get_wishlist(&user).await?;
    Ok(Json(products))
}

/// Add a product to the wishlist.
///
/// POST /api/wishlist
///
/// # Errors
///
/// Returns 400 when the product is already wishlisted.
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<WishlistRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    auth.add_to_wishlist(user, req.product_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Product added to wishlist")),
    ))
}

/// Remove a product from the wishlist. Removing an absent product succeeds.
///
/// DELETE /api/wishlist
///
/// # Errors
///
/// Returns 401 without a valid bearer token.
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<WishlistRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    auth.remove_from_wishlist(user, req.product_id).await?;

    Ok(Json(MessageResponse::new("Product removed from wishlist")))
}

// ============================================================================
// Addresses
// ============================================================================

/// Add an address to the account.
///
/// POST /api/addresses
///
/// # Errors
///
/// Returns 400 when the account already holds the maximum number of
/// addresses.
pub async fn add_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(address): Json<Address>,
) -> Result<(StatusCode, Json<AddressListResponse>)> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    let addresses = auth.add_address(user, address).await?;

    Ok((StatusCode::CREATED, Json(AddressListResponse { addresses })))
}

/// Replace the address at a positional index.
///
/// PUT /api/addresses/{index}
///
/// # Errors
///
/// Returns 404 when the index is out of range.
pub async fn update_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(index): Path<usize>,
    Json(address): Json<Address>,
) -> Result<Json<AddressListResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    let addresses = auth.update_address(user, index, address).await?;

    Ok(Json(AddressListResponse { addresses }))
}

/// Remove the address at a positional index.
///
/// DELETE /api/addresses/{index}
///
/// # Errors
///
/// Returns 404 when the index is out of range.
pub async fn delete_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(index): Path<usize>,
) -> Result<Json<AddressListResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    let addresses = auth.delete_address(user, index).await?;

    Ok(Json(AddressListResponse { addresses }))
}
