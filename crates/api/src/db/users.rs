//! User repository for database operations.
//!
//! The credential store. Email lookups rely on `Email::parse` having already
//! lowercased the address; the `users.email` unique index is the source of
//! truth for registration races.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use skin_affairs_core::{Email, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Address, User};

/// Row type for the `users` table.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    gender: Option<String>,
    birthday: Option<NaiveDate>,
    phone_number: Option<String>,
    is_verified: bool,
    is_admin: bool,
    addresses: Json<Vec<Address>>,
    wishlist: Json<Vec<ProductId>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            birthday: self.birthday,
            phone_number: self.phone_number,
            is_verified: self.is_verified,
            is_admin: self.is_admin,
            addresses: self.addresses.0,
            wishlist: self.wishlist.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, first_name, last_name, gender, birthday, phone_number, \
     is_verified, is_admin, addresses, wishlist, created_at, updated_at";

/// Fields required to create a new account.
///
/// The password arrives here already hashed; this module never sees a
/// plaintext password.
pub struct NewUser<'a> {
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub gender: Option<&'a str>,
    pub birthday: Option<NaiveDate>,
    pub phone_number: Option<&'a str>,
    pub password_hash: &'a str,
    pub is_admin: bool,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users \
                 (email, first_name, last_name, gender, birthday, phone_number, \
                  password_hash, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.email.as_str())
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.gender)
        .bind(new_user.birthday)
        .bind(new_user.phone_number)
        .bind(new_user.password_hash)
        .bind(new_user.is_admin)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_domain()
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist. Callers must not reveal
    /// which of the two (account or password) was wrong.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct HashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, HashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some((r.user.into_domain()?, r.password_hash)))
    }

    /// Mark the account with the given email as verified.
    ///
    /// Redemption of a verification token for a since-deleted account is a
    /// silent no-op, and re-verifying an already-verified account succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_verified(&self, email: &Email) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = now() WHERE email = $1")
                .bind(email.as_str())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(email = %email, "verification token matched no account");
        }

        Ok(())
    }

    /// Store a reset token and its expiry on the account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET reset_token = $1, reset_token_expires_at = $2, updated_at = now() \
             WHERE id = $3",
        )
        .bind(token)
        .bind(expires_at)
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Read the stored reset token and expiry for an account.
    ///
    /// Returns `None` when the account does not exist; the inner pair is the
    /// stored reset state (both fields absent outside a reset-pending cycle).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_reset_state(
        &self,
        id: UserId,
    ) -> Result<Option<(Option<String>, Option<DateTime<Utc>>)>, RepositoryError> {
        let row: Option<(Option<String>, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT reset_token, reset_token_expires_at FROM users WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Replace the password hash and clear both reset-token fields.
    ///
    /// Clearing the stored token is what makes a reset token single-use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password_clearing_reset(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET password_hash = $1, reset_token = NULL, reset_token_expires_at = NULL, \
                 updated_at = now() \
             WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Persist the full address list for an account.
    ///
    /// The list is written back whole, which keeps the capacity and
    /// single-default invariants enforced by the domain type intact under
    /// the per-row atomicity of the update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_addresses(
        &self,
        id: UserId,
        addresses: &[Address],
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET addresses = $1, updated_at = now() WHERE id = $2")
                .bind(Json(addresses))
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Persist the full wishlist for an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_wishlist(
        &self,
        id: UserId,
        wishlist: &[ProductId],
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET wishlist = $1, updated_at = now() WHERE id = $2")
                .bind(Json(wishlist))
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
