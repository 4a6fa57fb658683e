//! Review domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use skin_affairs_core::{ReviewId, UserId};

/// A site review (domain type). One per account.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// Account that wrote the review.
    pub user_id: UserId,
    /// Star rating, 1 to 5.
    pub rating: i32,
    /// Free-form comment.
    pub comment: String,
    /// When the review was written.
    pub created_at: DateTime<Utc>,
    /// When the review was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A review joined with the reviewer's first name, for public listings.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    /// Reviewer first name.
    pub author: String,
}
