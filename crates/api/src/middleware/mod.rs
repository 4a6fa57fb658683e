//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//!
//! The bearer-token access guard is not a layer; it is the [`auth::CurrentUser`]
//! extractor, applied per-handler on protected routes.

pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, RequireAdmin};
pub use request_id::request_id_middleware;
