//! Authentication extractors - the bearer-token access guard.
//!
//! This is the only point where identity enters protected operations: the
//! bearer token is verified, the subject is resolved against the store (the
//! resolved `User` carries no password hash), and the result is handed to
//! the handler. Every failure along the way is a plain 401; nothing reveals
//! whether the token or the account was the problem.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::models::User;
use crate::services::tokens::TokenPayload;
use crate::state::AppState;

/// Extractor that requires a valid bearer session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.first_name)
/// }
/// ```
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("not authorized, no token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("not authorized, no token".to_string()))?;

        let payload = state
            .tokens()
            .verify(token)
            .map_err(|_| AppError::Unauthorized("not authorized, token failed".to_string()))?;

        let TokenPayload::Session { user_id, .. } = payload else {
            return Err(AppError::Unauthorized(
                "not authorized, token failed".to_string(),
            ));
        };

        let user = UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("user not found".to_string()))?;

        Ok(Self(user))
    }
}

/// Extractor that requires a valid bearer session token for an admin account.
///
/// Resolves exactly like [`CurrentUser`], then rejects non-admin accounts
/// with 403.
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin {
            return Err(AppError::Forbidden("admin access required".to_string()));
        }

        Ok(Self(user))
    }
}
