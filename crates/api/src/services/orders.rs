//! Order workflow.
//!
//! Validates and prices incoming orders against the catalog, persists them,
//! and composes the admin/customer notifications. Line totals use decimal
//! arithmetic throughout.

use std::str::FromStr;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use skin_affairs_core::{DeliveryMethod, OrderId, OrderStatus, Price, ProductId};

use crate::db::RepositoryError;
use crate::db::orders::{NewOrder, OrderRepository};
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::models::{Order, OrderItem, User};
use crate::services::mailer::Mailer;

/// Errors that can occur in the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The delivery method is neither `pickup` nor `delivery`.
    #[error("invalid delivery method, choose 'pickup' or 'delivery'")]
    InvalidDeliveryMethod,

    /// Delivery orders must carry an address.
    #[error("address is required for delivery")]
    MissingAddress,

    /// Line quantities must be positive.
    #[error("quantity must be a positive number")]
    InvalidQuantity,

    /// A referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The order does not exist.
    #[error("order not found")]
    OrderNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A requested line item.
#[derive(Debug, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Order placement input, as submitted by the client.
///
/// The delivery method arrives as a raw string and is parsed in the
/// workflow so an unknown value is a 400, not a body-rejection.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub items: Vec<OrderLine>,
    pub delivery_method: String,
    pub address: Option<String>,
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    products: ProductRepository<'a>,
    users: UserRepository<'a>,
    mailer: &'a Mailer,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, mailer: &'a Mailer) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            products: ProductRepository::new(pool),
            users: UserRepository::new(pool),
            mailer,
        }
    }

    /// Place an order for the given account.
    ///
    /// Every referenced product must exist; the total is the sum of unit
    /// price times quantity across all lines. The order is persisted as
    /// `Pending`, then the admin notice and customer confirmation are sent
    /// best-effort.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::MissingAddress` for a delivery order without an
    /// address, `OrderError::InvalidQuantity` for a non-positive quantity,
    /// and `OrderError::ProductNotFound` for a dangling product reference.
    pub async fn place_order(&self, user: &User, form: PlaceOrderForm) -> Result<Order, OrderError> {
        let delivery_method = DeliveryMethod::from_str(&form.delivery_method)
            .map_err(|_| OrderError::InvalidDeliveryMethod)?;

        let address = match delivery_method {
            DeliveryMethod::Delivery => {
                let address = form
                    .address
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .ok_or(OrderError::MissingAddress)?;
                Some(address)
            }
            // Pickup orders never carry an address, even if one was sent
            DeliveryMethod::Pickup => None,
        };

        let mut total = Price::ZERO;
        let mut items = Vec::with_capacity(form.items.len());
        for line in &form.items {
            if line.quantity <= 0 {
                return Err(OrderError::InvalidQuantity);
            }

            let product = self
                .products
                .get(line.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(line.product_id))?;

            total += product.price.times(line.quantity);
            items.push(OrderItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
            });
        }

        let order = self
            .orders
            .create(NewOrder {
                user_id: user.id,
                user_name: &user.first_name,
                items: &items,
                total,
                delivery_method,
                address,
            })
            .await?;

        if let Err(e) = self
            .mailer
            .send_order_received_notice(&order, &user.email)
            .await
        {
            tracing::warn!(error = %e, order_id = %order.id, "failed to send order notice to admin");
        }

        if let Err(e) = self.mailer.send_order_confirmation(&user.email, &order).await {
            tracing::warn!(error = %e, order_id = %order.id, "failed to send order confirmation");
        }

        Ok(order)
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` when absent.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)
    }

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the read fails.
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list().await?)
    }

    /// Update an order's status.
    ///
    /// The transition to `Delivered` additionally notifies the customer,
    /// best-effort.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` when absent.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders
            .update_status(id, status)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if status == OrderStatus::Delivered {
            match self.users.get_by_id(order.user_id).await {
                Ok(Some(user)) => {
                    if let Err(e) = self
                        .mailer
                        .send_order_delivered(&user.email, &order.user_name)
                        .await
                    {
                        tracing::warn!(error = %e, order_id = %order.id, "failed to send delivered email");
                    }
                }
                Ok(None) => {
                    tracing::warn!(order_id = %order.id, "delivered order references a missing account");
                }
                Err(e) => {
                    tracing::warn!(error = %e, order_id = %order.id, "failed to look up order account");
                }
            }
        }

        Ok(order)
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` when absent.
    pub async fn delete_order(&self, id: OrderId) -> Result<(), OrderError> {
        self.orders.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => OrderError::OrderNotFound,
            other => OrderError::Repository(other),
        })
    }
}
