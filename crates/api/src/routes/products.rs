//! Catalog route handlers.
//!
//! Reads are public; writes require an admin session. Product creation and
//! the out-of-stock transition each notify the admin address, best-effort.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use skin_affairs_core::{Price, ProductId};

use crate::db::products::{NewProduct, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::state::AppState;

/// Product creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
}

/// Stock decrement request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Stock decrement response.
#[derive(Debug, Serialize)]
pub struct UpdateStockResponse {
    pub message: String,
    pub product: Product,
}

/// List all products.
///
/// GET /api/products
///
/// # Errors
///
/// Returns 500 if the catalog read fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Get a product by its ID.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// Returns 404 when the product does not exist.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    Ok(Json(product))
}

/// Create a product.
///
/// POST /api/products (admin)
///
/// # Errors
///
/// Returns 400 when the name is blank, 403 for non-admin sessions.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("product name is required".to_string()));
    }

    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            name,
            description: &req.description,
            category: &req.category,
            image_url: &req.image_url,
            price: Price::new(req.price),
            stock: req.stock,
        })
        .await?;

    if let Err(e) = state.mailer().send_product_added(&product).await {
        tracing::warn!(error = %e, product_id = %product.id, "failed to send product-added notice");
    }

    Ok((StatusCode::CREATED, Json(product)))
}

/// Decrement a product's stock.
///
/// POST /api/products/stock (admin)
///
/// Sends the out-of-stock alert exactly when the stock reaches zero.
///
/// # Errors
///
/// Returns 404 when the product does not exist, 403 for non-admin sessions.
pub async fn update_stock(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<UpdateStockResponse>> {
    let product = ProductRepository::new(state.pool())
        .decrement_stock(req.product_id, req.quantity)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    if product.stock == 0 {
        if let Err(e) = state.mailer().send_stock_alert(&product).await {
            tracing::warn!(error = %e, product_id = %product.id, "failed to send stock alert");
        }
    }

    Ok(Json(UpdateStockResponse {
        message: "Stock updated successfully".to_string(),
        product,
    }))
}
