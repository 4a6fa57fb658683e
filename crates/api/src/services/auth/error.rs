//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::tokens::TokenError;

/// Errors that can occur during authentication and account operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] skin_affairs_core::EmailError),

    /// A required registration field is blank after trimming.
    #[error("all fields are required")]
    MissingFields,

    /// No new password supplied on reset.
    #[error("password is required")]
    MissingPassword,

    /// The email is already registered.
    #[error("an account with this email already exists")]
    AlreadyRegistered,

    /// Invalid credentials (wrong password or no such account - callers
    /// must not be able to tell which).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The password matched but the email is not verified yet.
    #[error("email not verified, check your inbox")]
    EmailNotVerified,

    /// Token failed signature, expiry, or stored-value comparison.
    #[error("invalid or expired token")]
    InvalidToken,

    /// No account matches the given email.
    #[error("user not found")]
    UserNotFound,

    /// The account already holds the maximum number of addresses.
    #[error("address book is full (max {} addresses)", crate::models::MAX_ADDRESSES)]
    AddressBookFull,

    /// No address exists at the given position.
    #[error("no address at that position")]
    AddressNotFound,

    /// The product is already wishlisted.
    #[error("product is already in the wishlist")]
    AlreadyInWishlist,

    /// Token service failure.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
