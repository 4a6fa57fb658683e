//! Authentication workflow.
//!
//! Orchestrates the account lifecycle: registration, email verification,
//! login, password reset, and the authenticated address/wishlist operations.
//! Accounts move one way from unverified to verified; orthogonally, a stored
//! reset token opens a reset-pending cycle that closes on redemption.
//!
//! Notification delivery is best-effort everywhere: a failed send is logged
//! and never rolls back or fails the operation that triggered it.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use skin_affairs_core::{Email, ProductId};

use crate::db::products::ProductRepository;
use crate::db::users::{NewUser, UserRepository};
use crate::models::{Address, AddressBookError, Product, User};
use crate::services::mailer::Mailer;
use crate::services::tokens::{RESET_TTL_HOURS, TokenPayload, TokenService};

/// Registration input, as submitted by the client.
#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Authentication service.
///
/// Handles registration, verification, login, password reset, and the
/// account-scoped address and wishlist operations.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    products: ProductRepository<'a>,
    tokens: &'a TokenService,
    mailer: &'a Mailer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService, mailer: &'a Mailer) -> Self {
        Self {
            users: UserRepository::new(pool),
            products: ProductRepository::new(pool),
            tokens,
            mailer,
        }
    }

    // =========================================================================
    // Registration & Verification
    // =========================================================================

    /// Register a new account.
    ///
    /// Creates the account unverified, then sends the verification link to
    /// the user and a registration notice to the admin address. Neither
    /// delivery failure rolls back the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if a required field is blank after
    /// trimming, `AuthError::InvalidEmail` if the email is malformed, and
    /// `AuthError::AlreadyRegistered` if the email already exists.
    pub async fn register(&self, form: RegistrationForm) -> Result<User, AuthError> {
        let first_name = form.first_name.trim();
        let last_name = form.last_name.trim();
        let phone_number = form.phone_number.as_deref().map(str::trim);

        if first_name.is_empty() || last_name.is_empty() || form.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let email = Email::parse(&form.email)?;

        let password_hash = hash_password(&form.password)?;

        let user = self
            .users
            .create(NewUser {
                email: &email,
                first_name,
                last_name,
                gender: form.gender.as_deref(),
                birthday: form.birthday,
                phone_number,
                password_hash: &password_hash,
                is_admin: form.is_admin,
            })
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::Conflict(_) => AuthError::AlreadyRegistered,
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue_verification(&user.email)?;

        if let Err(e) = self
            .mailer
            .send_verification_email(&user.email, &user.first_name, &user.last_name, &token)
            .await
        {
            tracing::warn!(error = %e, email = %user.email, "failed to send verification email");
        }

        if let Err(e) = self
            .mailer
            .send_new_user_notice(&user.first_name, &user.last_name, &user.email)
            .await
        {
            tracing::warn!(error = %e, "failed to send new-user notice");
        }

        Ok(user)
    }

    /// Redeem an email-verification token.
    ///
    /// Idempotent: re-verifying an already-verified account succeeds, and a
    /// token whose account has since disappeared is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token cannot be verified or
    /// is not a verification token.
    pub async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        let Ok(TokenPayload::Verification { email }) = self.tokens.verify(token) else {
            return Err(AuthError::InvalidToken);
        };

        self.users.mark_verified(&email).await?;
        Ok(())
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Login with email and password, returning a session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the account does not exist
    /// or the password does not match - deliberately the same error for both.
    /// Returns `AuthError::EmailNotVerified` if the password matched but the
    /// email is unverified.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        // A malformed email matches no account, so it is the same failure
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        Ok(self.tokens.issue_session(user.id, user.is_admin)?)
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Begin a password reset: store a fresh reset token on the account and
    /// email the reset link.
    ///
    /// The stored token remains valid even if delivery fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account matches the email.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = self.tokens.issue_reset(user.id)?;
        let expires_at = Utc::now() + Duration::hours(RESET_TTL_HOURS);
        self.users
            .set_reset_token(user.id, &token, expires_at)
            .await?;

        if let Err(e) = self.mailer.send_password_reset(&user.email, &token).await {
            tracing::warn!(error = %e, email = %user.email, "failed to send password reset email");
        }

        Ok(())
    }

    /// Redeem a password-reset token.
    ///
    /// The presented token must decode, equal the stored token, and the
    /// stored expiry must be in the future. Success replaces the password
    /// hash and clears both reset fields, making the token single-use.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingPassword` if no new password is supplied.
    /// Returns `AuthError::InvalidToken` for every token failure: bad
    /// signature, expiry, reuse, or supersession by a newer token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        if new_password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let Ok(TokenPayload::Reset { user_id }) = self.tokens.verify(token) else {
            return Err(AuthError::InvalidToken);
        };

        let (stored_token, stored_expiry) = self
            .users
            .get_reset_state(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let token_matches = stored_token.as_deref() == Some(token);
        let still_valid = stored_expiry.is_some_and(|expiry| expiry > Utc::now());
        if !token_matches || !still_valid {
            return Err(AuthError::InvalidToken);
        }

        let password_hash = hash_password(new_password)?;
        self.users
            .update_password_clearing_reset(user_id, &password_hash)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Add an address to the account, returning the updated list.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AddressBookFull` past the capacity limit.
    pub async fn add_address(
        &self,
        mut user: User,
        address: Address,
    ) -> Result<Vec<Address>, AuthError> {
        user.add_address(address).map_err(address_error)?;
        self.users.set_addresses(user.id, &user.addresses).await?;
        Ok(user.addresses)
    }

    /// Replace the address at a positional index, returning the updated list.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AddressNotFound` when the index is out of range.
    pub async fn update_address(
        &self,
        mut user: User,
        index: usize,
        address: Address,
    ) -> Result<Vec<Address>, AuthError> {
        user.update_address(index, address).map_err(address_error)?;
        self.users.set_addresses(user.id, &user.addresses).await?;
        Ok(user.addresses)
    }

    /// Remove the address at a positional index, returning the updated list.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AddressNotFound` when the index is out of range.
    pub async fn delete_address(
        &self,
        mut user: User,
        index: usize,
    ) -> Result<Vec<Address>, AuthError> {
        user.remove_address(index).map_err(address_error)?;
        self.users.set_addresses(user.id, &user.addresses).await?;
        Ok(user.addresses)
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Add a product reference to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyInWishlist` on a duplicate add.
    pub async fn add_to_wishlist(
        &self,
        mut user: User,
        product_id: ProductId,
    ) -> Result<(), AuthError> {
        user.wishlist_add(product_id)
            .map_err(|_| AuthError::AlreadyInWishlist)?;
        self.users.set_wishlist(user.id, &user.wishlist).await?;
        Ok(())
    }

    /// Remove a product reference from the wishlist. Removing an absent
    /// entry succeeds silently.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if persistence fails.
    pub async fn remove_from_wishlist(
        &self,
        mut user: User,
        product_id: ProductId,
    ) -> Result<(), AuthError> {
        user.wishlist_remove(product_id);
        self.users.set_wishlist(user.id, &user.wishlist).await?;
        Ok(())
    }

    /// Resolve the wishlist against the catalog.
    ///
    /// References whose product has since been deleted are skipped.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the catalog read fails.
    pub async fn get_wishlist(&self, user: &User) -> Result<Vec<Product>, AuthError> {
        Ok(self.products.get_many(&user.wishlist).await?)
    }
}

const fn address_error(err: AddressBookError) -> AuthError {
    match err {
        AddressBookError::Full => AuthError::AddressBookFull,
        AddressBookError::OutOfRange(_) => AuthError::AddressNotFound,
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hash).is_ok());
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("secret1").unwrap();
        assert!(matches!(
            verify_password("secret2", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(matches!(
            verify_password("secret1", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("plaintext-password").unwrap();
        assert!(!hash.contains("plaintext-password"));
    }
}
