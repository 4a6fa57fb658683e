//! Email delivery for notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Delivery is
//! best-effort from every workflow's perspective: call sites log failures and
//! carry on. Nothing here retries.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use skin_affairs_core::{Email, Price};

use crate::config::EmailConfig;
use crate::models::{Order, OrderItem, Product};

/// HTML template for the email-verification message.
#[derive(Template)]
#[template(path = "email/verification.html")]
struct VerificationEmailHtml<'a> {
    first_name: &'a str,
    last_name: &'a str,
    link: &'a str,
}

/// Plain text template for the email-verification message.
#[derive(Template)]
#[template(path = "email/verification.txt")]
struct VerificationEmailText<'a> {
    first_name: &'a str,
    last_name: &'a str,
    link: &'a str,
}

/// HTML template for the new-registration notice sent to the admin.
#[derive(Template)]
#[template(path = "email/new_user_notice.html")]
struct NewUserNoticeHtml<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
}

/// Plain text template for the new-registration notice.
#[derive(Template)]
#[template(path = "email/new_user_notice.txt")]
struct NewUserNoticeText<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
}

/// HTML template for the password-reset message.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    link: &'a str,
}

/// Plain text template for the password-reset message.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetText<'a> {
    link: &'a str,
}

/// HTML template for the customer order confirmation.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    user_name: &'a str,
    items: &'a [OrderItem],
    total: Price,
    delivery_method: String,
    address: Option<&'a str>,
}

/// Plain text template for the customer order confirmation.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    user_name: &'a str,
    total: Price,
}

/// HTML template for the new-order notice sent to the admin.
#[derive(Template)]
#[template(path = "email/order_received.html")]
struct OrderReceivedHtml<'a> {
    user_name: &'a str,
    user_email: &'a str,
    items: &'a [OrderItem],
    total: Price,
    delivery_method: String,
    address: Option<&'a str>,
}

/// Plain text template for the new-order notice.
#[derive(Template)]
#[template(path = "email/order_received.txt")]
struct OrderReceivedText<'a> {
    user_name: &'a str,
    total: Price,
}

/// HTML template for the order-delivered message.
#[derive(Template)]
#[template(path = "email/order_delivered.html")]
struct OrderDeliveredHtml<'a> {
    user_name: &'a str,
}

/// Plain text template for the order-delivered message.
#[derive(Template)]
#[template(path = "email/order_delivered.txt")]
struct OrderDeliveredText<'a> {
    user_name: &'a str,
}

/// HTML template for the product-added notice sent to the admin.
#[derive(Template)]
#[template(path = "email/product_added.html")]
struct ProductAddedHtml<'a> {
    product_name: &'a str,
    price: Price,
    stock: i32,
}

/// Plain text template for the product-added notice.
#[derive(Template)]
#[template(path = "email/product_added.txt")]
struct ProductAddedText<'a> {
    product_name: &'a str,
    price: Price,
    stock: i32,
}

/// HTML template for the out-of-stock alert sent to the admin.
#[derive(Template)]
#[template(path = "email/stock_alert.html")]
struct StockAlertHtml<'a> {
    product_name: &'a str,
    price: Price,
}

/// Plain text template for the out-of-stock alert.
#[derive(Template)]
#[template(path = "email/stock_alert.txt")]
struct StockAlertText<'a> {
    product_name: &'a str,
    price: Price,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional notifications.
#[derive(Clone)]
pub struct Mailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    admin_email: Email,
    frontend_url: String,
}

impl Mailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(
        config: &EmailConfig,
        admin_email: Email,
        frontend_url: String,
    ) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            admin_email,
            frontend_url,
        })
    }

    /// Send the verification link to a newly registered user.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_verification_email(
        &self,
        to: &Email,
        first_name: &str,
        last_name: &str,
        token: &str,
    ) -> Result<(), MailerError> {
        let link = format!("{}/verify-email/{token}", self.frontend_url);
        let html = VerificationEmailHtml {
            first_name,
            last_name,
            link: &link,
        }
        .render()?;
        let text = VerificationEmailText {
            first_name,
            last_name,
            link: &link,
        }
        .render()?;

        self.send(to.as_str(), "Verify Your Email - Skin Affairs", &text, &html)
            .await
    }

    /// Notify the admin address of a new registration.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_new_user_notice(
        &self,
        first_name: &str,
        last_name: &str,
        email: &Email,
    ) -> Result<(), MailerError> {
        let html = NewUserNoticeHtml {
            first_name,
            last_name,
            email: email.as_str(),
        }
        .render()?;
        let text = NewUserNoticeText {
            first_name,
            last_name,
            email: email.as_str(),
        }
        .render()?;
        let subject = format!("New User Registered: {last_name} {first_name}");

        self.send(self.admin_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a password-reset link.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_password_reset(&self, to: &Email, token: &str) -> Result<(), MailerError> {
        let link = format!("{}/reset-password/{token}", self.frontend_url);
        let html = PasswordResetHtml { link: &link }.render()?;
        let text = PasswordResetText { link: &link }.render()?;

        self.send(to.as_str(), "Password Reset Request", &text, &html)
            .await
    }

    /// Send the order confirmation to the customer.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_order_confirmation(
        &self,
        to: &Email,
        order: &Order,
    ) -> Result<(), MailerError> {
        let html = OrderConfirmationHtml {
            user_name: &order.user_name,
            items: &order.items,
            total: order.total,
            delivery_method: order.delivery_method.to_string(),
            address: order.address.as_deref(),
        }
        .render()?;
        let text = OrderConfirmationText {
            user_name: &order.user_name,
            total: order.total,
        }
        .render()?;

        self.send(
            to.as_str(),
            "Order Confirmation - Thank You for Your Purchase!",
            &text,
            &html,
        )
        .await
    }

    /// Notify the admin address of a newly placed order.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_order_received_notice(
        &self,
        order: &Order,
        user_email: &Email,
    ) -> Result<(), MailerError> {
        let html = OrderReceivedHtml {
            user_name: &order.user_name,
            user_email: user_email.as_str(),
            items: &order.items,
            total: order.total,
            delivery_method: order.delivery_method.to_string(),
            address: order.address.as_deref(),
        }
        .render()?;
        let text = OrderReceivedText {
            user_name: &order.user_name,
            total: order.total,
        }
        .render()?;

        self.send(self.admin_email.as_str(), "New Order Received", &text, &html)
            .await
    }

    /// Tell the customer their order was delivered.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_order_delivered(
        &self,
        to: &Email,
        user_name: &str,
    ) -> Result<(), MailerError> {
        let html = OrderDeliveredHtml { user_name }.render()?;
        let text = OrderDeliveredText { user_name }.render()?;

        self.send(to.as_str(), "Your Order Has Been Delivered!", &text, &html)
            .await
    }

    /// Notify the admin address of a newly added catalog product.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_product_added(&self, product: &Product) -> Result<(), MailerError> {
        let html = ProductAddedHtml {
            product_name: &product.name,
            price: product.price,
            stock: product.stock,
        }
        .render()?;
        let text = ProductAddedText {
            product_name: &product.name,
            price: product.price,
            stock: product.stock,
        }
        .render()?;

        self.send(self.admin_email.as_str(), "New Product Added!", &text, &html)
            .await
    }

    /// Alert the admin address that a product ran out of stock.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_stock_alert(&self, product: &Product) -> Result<(), MailerError> {
        let html = StockAlertHtml {
            product_name: &product.name,
            price: product.price,
        }
        .render()?;
        let text = StockAlertText {
            product_name: &product.name,
            price: product.price,
        }
        .render()?;

        self.send(self.admin_email.as_str(), "Stock Alert: Product Out of Stock!", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), MailerError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailerError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailerError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use skin_affairs_core::{DeliveryMethod, OrderId, OrderStatus, ProductId, UserId};

    fn test_order() -> Order {
        Order {
            id: OrderId::new(1),
            user_id: UserId::new(1),
            user_name: "Ada".to_string(),
            items: vec![OrderItem {
                product_id: ProductId::new(3),
                product_name: "Shea Butter".to_string(),
                quantity: 2,
            }],
            total: Price::new(Decimal::new(3998, 2)),
            status: OrderStatus::Pending,
            delivery_method: DeliveryMethod::Delivery,
            address: Some("1 Main St, Lagos".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_verification_templates_render_values() {
        let html = VerificationEmailHtml {
            first_name: "Ada",
            last_name: "Lovelace",
            link: "https://shop.example/verify-email/tok123",
        }
        .render()
        .unwrap();
        assert!(html.contains("Ada"));
        assert!(html.contains("https://shop.example/verify-email/tok123"));

        let text = VerificationEmailText {
            first_name: "Ada",
            last_name: "Lovelace",
            link: "https://shop.example/verify-email/tok123",
        }
        .render()
        .unwrap();
        assert!(text.contains("tok123"));
    }

    #[test]
    fn test_order_confirmation_renders_items_and_total() {
        let order = test_order();
        let html = OrderConfirmationHtml {
            user_name: &order.user_name,
            items: &order.items,
            total: order.total,
            delivery_method: order.delivery_method.to_string(),
            address: order.address.as_deref(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Shea Butter"));
        assert!(html.contains("$39.98"));
        assert!(html.contains("1 Main St, Lagos"));
    }

    #[test]
    fn test_order_confirmation_pickup_has_no_address_line() {
        let mut order = test_order();
        order.delivery_method = DeliveryMethod::Pickup;
        order.address = None;

        let html = OrderConfirmationHtml {
            user_name: &order.user_name,
            items: &order.items,
            total: order.total,
            delivery_method: order.delivery_method.to_string(),
            address: order.address.as_deref(),
        }
        .render()
        .unwrap();

        assert!(html.contains("pickup"));
        assert!(!html.contains("Delivery Address"));
    }

    #[test]
    fn test_stock_alert_renders_product() {
        let html = StockAlertHtml {
            product_name: "Shea Butter",
            price: Price::new(Decimal::new(1999, 2)),
        }
        .render()
        .unwrap();
        assert!(html.contains("Shea Butter"));
        assert!(html.contains("$19.99"));
    }
}
