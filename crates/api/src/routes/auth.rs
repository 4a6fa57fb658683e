//! Authentication route handlers.
//!
//! Registration, login, email verification, and the password-reset pair.
//! All responses are JSON; error bodies come from [`AppError`].

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::auth::{AuthService, RegistrationForm};
use crate::state::AppState;

use super::MessageResponse;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response carrying the session token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Forgot-password request body.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request body.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Register a new account.
///
/// POST /api/register
///
/// # Errors
///
/// Returns 400 for blank fields, a malformed email, or a duplicate email.
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    let user = auth.register(form).await?;

    tracing::info!(user_id = %user.id, email = %user.email, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "User registered. Check email for verification link.",
        )),
    ))
}

/// Login with email and password.
///
/// POST /api/login
///
/// # Errors
///
/// Returns 401 for a missing account or wrong password (indistinguishable),
/// 403 when the password matches but the email is unverified.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    let token = auth.login(&req.email, &req.password).await?;

    Ok(Json(TokenResponse { token }))
}

/// Redeem an email-verification token.
///
/// GET /api/verify-email/{token}
///
/// # Errors
///
/// Returns 400 when the token cannot be verified.
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    auth.verify_email(&token).await?;

    Ok(Json(MessageResponse::new(
        "Email verified. You can log in now.",
    )))
}

/// Begin a password reset.
///
/// POST /api/forgot-password
///
/// # Errors
///
/// Returns 404 when no account matches the email.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    auth.forgot_password(&req.email).await?;

    Ok(Json(MessageResponse::new(
        "Password reset link sent to your email.",
    )))
}

/// Redeem a password-reset token.
///
/// POST /api/reset-password/{token}
///
/// # Errors
///
/// Returns 400 for a blank password or any token failure.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.mailer());
    auth.reset_password(&token, &req.password).await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}
