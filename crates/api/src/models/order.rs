//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skin_affairs_core::{DeliveryMethod, OrderId, OrderStatus, Price, ProductId, UserId};

/// A line item on an order.
///
/// The product name is denormalized at placement time so order history
/// survives later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
}

/// A placed order (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Account that placed the order.
    pub user_id: UserId,
    /// Customer first name at placement time.
    pub user_name: String,
    /// Ordered line items.
    pub items: Vec<OrderItem>,
    /// Total price across all line items.
    pub total: Price,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// Pickup or delivery.
    pub delivery_method: DeliveryMethod,
    /// Shipping address; present exactly when the method is delivery.
    pub address: Option<String>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}
