//! Product domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use skin_affairs_core::{Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Category label (free-form).
    pub category: String,
    /// URL of the product image.
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Units currently in stock.
    pub stock: i32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
