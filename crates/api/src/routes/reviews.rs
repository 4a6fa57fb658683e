//! Review route handlers.
//!
//! One review per account. Listing is public; everything else requires a
//! bearer session, and only the owner may mutate a review.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use skin_affairs_core::ReviewId;

use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Review, ReviewWithAuthor};
use crate::state::AppState;

use super::MessageResponse;

/// Review create/update request body.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i32,
    pub comment: String,
}

fn validate_rating(rating: i32) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

/// Add a review for the current account.
///
/// POST /api/reviews
///
/// # Errors
///
/// Returns 400 for an out-of-range rating or a second review from the same
/// account.
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    validate_rating(req.rating)?;

    let review = ReviewRepository::new(state.pool())
        .create(user.id, req.rating, &req.comment)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other),
        })?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// List all reviews with their authors.
///
/// GET /api/reviews
///
/// # Errors
///
/// Returns 500 if the read fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ReviewWithAuthor>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_with_authors()
        .await?;
    Ok(Json(reviews))
}

/// Update the current account's review.
///
/// PUT /api/reviews/{id}
///
/// # Errors
///
/// Returns 404 when the review does not exist, 403 when it belongs to
/// another account.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<ReviewId>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<Review>> {
    validate_rating(req.rating)?;

    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("review".to_string()))?;

    if review.user_id != user.id {
        return Err(AppError::Forbidden(
            "you can only update your own review".to_string(),
        ));
    }

    let updated = repo
        .update(id, req.rating, &req.comment)
        .await?
        .ok_or_else(|| AppError::NotFound("review".to_string()))?;

    Ok(Json(updated))
}

/// Delete the current account's review.
///
/// DELETE /api/reviews/{id}
///
/// # Errors
///
/// Returns 404 when the review does not exist, 403 when it belongs to
/// another account.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<ReviewId>,
) -> Result<Json<MessageResponse>> {
    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("review".to_string()))?;

    if review.user_id != user.id {
        return Err(AppError::Forbidden(
            "you can only delete your own review".to_string(),
        ));
    }

    repo.delete(id).await?;

    Ok(Json(MessageResponse::new("Review deleted")))
}
