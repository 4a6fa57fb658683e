//! Order route handlers.
//!
//! Placement and retrieval require a bearer session; the listing, status
//! updates, and deletion are admin operations.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use skin_affairs_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::Order;
use crate::services::orders::{OrderService, PlaceOrderForm};
use crate::state::AppState;

use super::MessageResponse;

/// Status update request body.
///
/// The status arrives as a raw string and is parsed in the handler so an
/// unknown value is a 400, not a body-rejection.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Place an order for the current account.
///
/// POST /api/orders
///
/// # Errors
///
/// Returns 400 for an invalid delivery method, a missing delivery address,
/// or a non-positive quantity; 404 for a dangling product reference.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<PlaceOrderForm>,
) -> Result<(StatusCode, Json<Order>)> {
    let orders = OrderService::new(state.pool(), state.mailer());
    let order = orders.place_order(&user, form).await?;

    tracing::info!(order_id = %order.id, user_id = %user.id, total = %order.total, "order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Get an order by its ID.
///
/// GET /api/orders/{id}
///
/// Accounts may fetch their own orders; admins may fetch any.
///
/// # Errors
///
/// Returns 404 when the order does not exist, 403 when it belongs to
/// another account.
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let orders = OrderService::new(state.pool(), state.mailer());
    let order = orders.get_order(id).await?;

    if order.user_id != user.id && !user.is_admin {
        return Err(AppError::Forbidden(
            "you can only view your own orders".to_string(),
        ));
    }

    Ok(Json(order))
}

/// List all orders.
///
/// GET /api/orders (admin)
///
/// # Errors
///
/// Returns 403 for non-admin sessions.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool(), state.mailer());
    Ok(Json(orders.list_orders().await?))
}

/// Update an order's status.
///
/// PUT /api/orders/{id} (admin)
///
/// # Errors
///
/// Returns 404 when the order does not exist, 403 for non-admin sessions.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let status = OrderStatus::from_str(&req.status).map_err(AppError::Validation)?;

    let orders = OrderService::new(state.pool(), state.mailer());
    let order = orders.update_status(id, status).await?;

    Ok(Json(order))
}

/// Delete an order.
///
/// DELETE /api/orders/{id} (admin)
///
/// # Errors
///
/// Returns 404 when the order does not exist, 403 for non-admin sessions.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<MessageResponse>> {
    let orders = OrderService::new(state.pool(), state.mailer());
    orders.delete_order(id).await?;

    Ok(Json(MessageResponse::new("Order deleted")))
}
