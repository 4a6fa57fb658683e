//! Token service: mints and verifies signed, time-bounded credentials.
//!
//! All tokens are HS256 JWTs signed with one process-wide secret. The payload
//! is a closed set of variants, validated here before any field access — a
//! session token can never be redeemed as a reset token or vice versa. Every
//! verification failure (bad signature, expired, malformed, wrong shape)
//! collapses to the same [`TokenError::Invalid`].

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skin_affairs_core::{Email, UserId};

/// Lifetime of an email-verification token.
pub const VERIFICATION_TTL_HOURS: i64 = 24;
/// Lifetime of a session token.
pub const SESSION_TTL_HOURS: i64 = 24;
/// Lifetime of a password-reset token.
pub const RESET_TTL_HOURS: i64 = 1;

/// Errors from token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, expiry, or shape check failed. Deliberately carries no
    /// detail about which check failed.
    #[error("invalid or expired token")]
    Invalid,

    /// Token could not be minted.
    #[error("token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),
}

/// The closed set of token payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "purpose", rename_all = "snake_case")]
pub enum TokenPayload {
    /// Email-verification token; carries the address to confirm.
    Verification { email: Email },
    /// Session bearer token.
    Session { user_id: UserId, is_admin: bool },
    /// Password-reset token; also persisted on the account for the
    /// single-use comparison at redemption time.
    Reset { user_id: UserId },
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    payload: TokenPayload,
    exp: i64,
    iat: i64,
}

/// Issues and verifies signed tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a token service from the process-wide signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Mint an email-verification token (24 h).
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if the token cannot be signed.
    pub fn issue_verification(&self, email: &Email) -> Result<String, TokenError> {
        self.issue(
            TokenPayload::Verification {
                email: email.clone(),
            },
            VERIFICATION_TTL_HOURS,
        )
    }

    /// Mint a session token (24 h).
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if the token cannot be signed.
    pub fn issue_session(&self, user_id: UserId, is_admin: bool) -> Result<String, TokenError> {
        self.issue(TokenPayload::Session { user_id, is_admin }, SESSION_TTL_HOURS)
    }

    /// Mint a password-reset token (1 h).
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if the token cannot be signed.
    pub fn issue_reset(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue(TokenPayload::Reset { user_id }, RESET_TTL_HOURS)
    }

    /// Verify a token and return its payload.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for any verification failure; callers
    /// must treat all failures identically.
    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.payload)
            .map_err(|_| TokenError::Invalid)
    }

    fn issue(&self, payload: TokenPayload, ttl_hours: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            payload,
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(TokenError::Encoding)
    }

    #[cfg(test)]
    #[allow(clippy::unwrap_used)]
    fn issue_with_exp(&self, payload: TokenPayload, exp: i64) -> String {
        encode(
            &Header::default(),
            &Claims {
                payload,
                exp,
                iat: Utc::now().timestamp(),
            },
            &self.encoding_key,
        )
        .unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(&SecretString::from("kP4#vN8!qR2@wX6$jM0&hT9*bL3^fD7z"))
    }

    fn test_email() -> Email {
        Email::parse("a@x.com").unwrap()
    }

    #[test]
    fn test_verification_roundtrip() {
        let service = test_service();
        let token = service.issue_verification(&test_email()).unwrap();

        let payload = service.verify(&token).unwrap();
        assert_eq!(
            payload,
            TokenPayload::Verification {
                email: test_email()
            }
        );
    }

    #[test]
    fn test_session_roundtrip() {
        let service = test_service();
        let token = service.issue_session(UserId::new(7), true).unwrap();

        let payload = service.verify(&token).unwrap();
        assert_eq!(
            payload,
            TokenPayload::Session {
                user_id: UserId::new(7),
                is_admin: true
            }
        );
    }

    #[test]
    fn test_reset_roundtrip() {
        let service = test_service();
        let token = service.issue_reset(UserId::new(7)).unwrap();

        let payload = service.verify(&token).unwrap();
        assert_eq!(
            payload,
            TokenPayload::Reset {
                user_id: UserId::new(7)
            }
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = test_service();
        // Two hours in the past clears the default leeway window
        let exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = service.issue_with_exp(
            TokenPayload::Session {
                user_id: UserId::new(1),
                is_admin: false,
            },
            exp,
        );

        assert!(matches!(service.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();
        let token = service.issue_session(UserId::new(1), false).unwrap();

        let mut tampered = token;
        tampered.pop();
        tampered.push('A');

        assert!(matches!(
            service.verify(&tampered),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let issuer = test_service();
        let verifier =
            TokenService::new(&SecretString::from("zQ1!mC5@xV9#nB3$kJ7&gF0*dS4^aW8y"));
        let token = issuer.issue_session(UserId::new(1), false).unwrap();

        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_rejected() {
        let service = test_service();
        assert!(matches!(
            service.verify("not-a-token"),
            Err(TokenError::Invalid)
        ));
    }
}
