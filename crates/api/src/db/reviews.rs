//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use skin_affairs_core::{ReviewId, UserId};

use super::RepositoryError;
use crate::models::{Review, ReviewWithAuthor};

/// Row type for the `reviews` table.
#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    user_id: i32,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            user_id: UserId::new(row.user_id),
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const REVIEW_COLUMNS: &str = "id, user_id, rating, comment, created_at, updated_at";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all reviews joined with the reviewer's first name, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_authors(&self) -> Result<Vec<ReviewWithAuthor>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct AuthorRow {
            #[sqlx(flatten)]
            review: ReviewRow,
            author: String,
        }

        let rows = sqlx::query_as::<_, AuthorRow>(
            "SELECT r.id, r.user_id, r.rating, r.comment, r.created_at, r.updated_at, \
                    u.first_name AS author \
             FROM reviews r \
             JOIN users u ON u.id = r.user_id \
             ORDER BY r.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ReviewWithAuthor {
                review: Review::from(r.review),
                author: r.author,
            })
            .collect())
    }

    /// Get a review by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    /// Create a review for an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the account already has a
    /// review (one review per account, enforced by a unique index).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        rating: i32,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO reviews (user_id, rating, comment) \
             VALUES ($1, $2, $3) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "you have already submitted a review".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Ok(Review::from(row))
    }

    /// Update a review's rating and comment.
    ///
    /// Returns the updated review, or `None` if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: i32,
        comment: &str,
    ) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET rating = $1, comment = $2, updated_at = now() WHERE id = $3 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(rating)
        .bind(comment)
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Review::from))
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
