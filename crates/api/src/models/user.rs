//! User domain types.
//!
//! The `User` type deliberately has no password-hash field. The hash is read
//! only through `UserRepository::get_password_hash` and never leaves the auth
//! workflow.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skin_affairs_core::{Email, ProductId, UserId};

/// Maximum number of addresses an account may hold.
pub const MAX_ADDRESSES: usize = 3;

/// A registered account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Case-normalized email address.
    pub email: Email,
    /// First name, trimmed at registration.
    pub first_name: String,
    /// Last name, trimmed at registration.
    pub last_name: String,
    /// Self-reported gender, if provided.
    pub gender: Option<String>,
    /// Date of birth, if provided.
    pub birthday: Option<NaiveDate>,
    /// Contact phone number, if provided.
    pub phone_number: Option<String>,
    /// Whether the email has been verified.
    pub is_verified: bool,
    /// Whether the account has administrative rights.
    pub is_admin: bool,
    /// Shipping/billing addresses, at most [`MAX_ADDRESSES`].
    pub addresses: Vec<Address>,
    /// Wishlisted product references, duplicate-free.
    pub wishlist: Vec<ProductId>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A shipping/billing address embedded on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    /// At most one address per account carries this flag.
    #[serde(default)]
    pub is_default: bool,
}

/// Errors from address-book mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressBookError {
    /// The account already holds [`MAX_ADDRESSES`] addresses.
    #[error("address book is full (max {MAX_ADDRESSES} addresses)")]
    Full,
    /// No address exists at the given position.
    #[error("no address at index {0}")]
    OutOfRange(usize),
}

/// Returned when adding a product already present in the wishlist.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("product is already in the wishlist")]
pub struct AlreadyInWishlist;

impl User {
    /// Append an address, keeping the single-default invariant.
    ///
    /// If the new address is flagged default, the flag is cleared on every
    /// existing address first.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::Full`] when the account already holds
    /// [`MAX_ADDRESSES`] addresses.
    pub fn add_address(&mut self, address: Address) -> Result<(), AddressBookError> {
        if self.addresses.len() >= MAX_ADDRESSES {
            return Err(AddressBookError::Full);
        }
        if address.is_default {
            self.clear_default_addresses();
        }
        self.addresses.push(address);
        Ok(())
    }

    /// Replace the address at a positional index.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::OutOfRange`] when no address exists at the
    /// index.
    pub fn update_address(
        &mut self,
        index: usize,
        address: Address,
    ) -> Result<(), AddressBookError> {
        if index >= self.addresses.len() {
            return Err(AddressBookError::OutOfRange(index));
        }
        if address.is_default {
            self.clear_default_addresses();
        }
        if let Some(slot) = self.addresses.get_mut(index) {
            *slot = address;
        }
        Ok(())
    }

    /// Remove the address at a positional index.
    ///
    /// # Errors
    ///
    /// Returns [`AddressBookError::OutOfRange`] when no address exists at the
    /// index.
    pub fn remove_address(&mut self, index: usize) -> Result<(), AddressBookError> {
        if index >= self.addresses.len() {
            return Err(AddressBookError::OutOfRange(index));
        }
        self.addresses.remove(index);
        Ok(())
    }

    fn clear_default_addresses(&mut self) {
        for existing in &mut self.addresses {
            existing.is_default = false;
        }
    }

    /// Add a product reference to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyInWishlist`] when the product is already present.
    pub fn wishlist_add(&mut self, product_id: ProductId) -> Result<(), AlreadyInWishlist> {
        if self.wishlist.contains(&product_id) {
            return Err(AlreadyInWishlist);
        }
        self.wishlist.push(product_id);
        Ok(())
    }

    /// Remove a product reference from the wishlist.
    ///
    /// Removing an absent entry is a silent no-op.
    pub fn wishlist_remove(&mut self, product_id: ProductId) {
        self.wishlist.retain(|id| *id != product_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("a@x.com").unwrap(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            gender: None,
            birthday: None,
            phone_number: None,
            is_verified: true,
            is_admin: false,
            addresses: Vec::new(),
            wishlist: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_address(street: &str, is_default: bool) -> Address {
        Address {
            street: street.to_string(),
            city: "Lagos".to_string(),
            state: "LA".to_string(),
            postal_code: "100001".to_string(),
            country: "NG".to_string(),
            is_default,
        }
    }

    #[test]
    fn test_add_address_capacity() {
        let mut user = test_user();
        for i in 0..MAX_ADDRESSES {
            user.add_address(test_address(&format!("{i} Main St"), false))
                .unwrap();
        }
        assert_eq!(
            user.add_address(test_address("overflow", false)),
            Err(AddressBookError::Full)
        );
        assert_eq!(user.addresses.len(), MAX_ADDRESSES);
    }

    #[test]
    fn test_new_default_clears_previous_default() {
        let mut user = test_user();
        user.add_address(test_address("1 First St", true)).unwrap();
        user.add_address(test_address("2 Second St", true)).unwrap();

        let defaults: Vec<_> = user.addresses.iter().filter(|a| a.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults.first().unwrap().street, "2 Second St");
    }

    #[test]
    fn test_update_address_default_clears_others() {
        let mut user = test_user();
        user.add_address(test_address("1 First St", true)).unwrap();
        user.add_address(test_address("2 Second St", false))
            .unwrap();

        user.update_address(1, test_address("2 Second St", true))
            .unwrap();

        assert!(!user.addresses.first().unwrap().is_default);
        assert!(user.addresses.get(1).unwrap().is_default);
    }

    #[test]
    fn test_update_address_out_of_range() {
        let mut user = test_user();
        assert_eq!(
            user.update_address(0, test_address("nowhere", false)),
            Err(AddressBookError::OutOfRange(0))
        );
    }

    #[test]
    fn test_remove_address() {
        let mut user = test_user();
        user.add_address(test_address("1 First St", false)).unwrap();
        user.remove_address(0).unwrap();
        assert!(user.addresses.is_empty());
        assert_eq!(user.remove_address(0), Err(AddressBookError::OutOfRange(0)));
    }

    #[test]
    fn test_wishlist_add_rejects_duplicate() {
        let mut user = test_user();
        user.wishlist_add(ProductId::new(5)).unwrap();
        assert_eq!(user.wishlist_add(ProductId::new(5)), Err(AlreadyInWishlist));
        assert_eq!(user.wishlist.len(), 1);
    }

    #[test]
    fn test_wishlist_remove_absent_is_noop() {
        let mut user = test_user();
        user.wishlist_add(ProductId::new(5)).unwrap();
        user.wishlist_remove(ProductId::new(9));
        assert_eq!(user.wishlist, vec![ProductId::new(5)]);
        user.wishlist_remove(ProductId::new(5));
        assert!(user.wishlist.is_empty());
    }

    #[test]
    fn test_address_serde_default_flag() {
        let json = r#"{"street":"1 Main","city":"Lagos","state":"LA","postal_code":"100001","country":"NG"}"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert!(!address.is_default);
    }
}
