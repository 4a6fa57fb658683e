//! Business-logic services.
//!
//! Each service is constructed per-request from the shared state: borrow the
//! pool and the long-lived token/mail clients, do the work, drop.

pub mod auth;
pub mod mailer;
pub mod orders;
pub mod tokens;

pub use auth::{AuthError, AuthService};
pub use mailer::{Mailer, MailerError};
pub use orders::{OrderError, OrderService};
pub use tokens::{TokenError, TokenPayload, TokenService};
