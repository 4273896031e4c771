//! Address book persistence.

use std::sync::Arc;

use folio_store::{store_key, Collection, DocumentStore, OwnerLocks};
use tracing::instrument;

use crate::address::{Address, AddressBook, AddressPatch, NewAddress};
use crate::error::CommerceError;
use crate::ids::{AddressId, OwnerId};

/// Address books, one document per owner keyed by owner ID.
pub const ADDRESS_BOOKS: Collection<AddressBook> = Collection::new("address_books");

/// Authoritative address book store.
#[derive(Clone)]
pub struct AddressBookStore {
    store: Arc<dyn DocumentStore>,
    locks: Arc<OwnerLocks>,
}

impl AddressBookStore {
    /// Create an address book store.
    pub fn new(store: Arc<dyn DocumentStore>, locks: Arc<OwnerLocks>) -> Self {
        Self { store, locks }
    }

    /// Load the owner's book, or an empty one.
    pub async fn book(&self, owner_id: &OwnerId) -> Result<AddressBook, CommerceError> {
        Ok(ADDRESS_BOOKS
            .get(self.store.as_ref(), owner_id.as_str())
            .await?
            .map(|v| v.into_inner())
            .unwrap_or_else(|| AddressBook::new(owner_id.clone())))
    }

    /// Add an address.
    #[instrument(skip(self, new), fields(owner = %owner_id, is_default = new.is_default))]
    pub async fn add(&self, owner_id: &OwnerId, new: NewAddress) -> Result<Address, CommerceError> {
        let address = self
            .modify(owner_id, |book| book.add(new.clone()))
            .await?;
        tracing::debug!(address = %address.id, is_default = address.is_default, "address added");
        Ok(address)
    }

    /// Update an address.
    #[instrument(skip(self, patch), fields(owner = %owner_id, address = %address_id))]
    pub async fn update(
        &self,
        owner_id: &OwnerId,
        address_id: &AddressId,
        patch: AddressPatch,
    ) -> Result<Address, CommerceError> {
        let address = self
            .modify(owner_id, |book| book.update(address_id, &patch))
            .await?;
        tracing::debug!("address updated");
        Ok(address)
    }

    /// Remove an address.
    #[instrument(skip(self), fields(owner = %owner_id, address = %address_id))]
    pub async fn remove(
        &self,
        owner_id: &OwnerId,
        address_id: &AddressId,
    ) -> Result<Address, CommerceError> {
        let removed = self
            .modify(owner_id, |book| book.remove(address_id))
            .await?;
        tracing::debug!("address removed");
        Ok(removed)
    }

    /// Make an address the owner's default.
    #[instrument(skip(self), fields(owner = %owner_id, address = %address_id))]
    pub async fn set_default(
        &self,
        owner_id: &OwnerId,
        address_id: &AddressId,
    ) -> Result<Address, CommerceError> {
        let address = self
            .modify(owner_id, |book| book.set_default(address_id))
            .await?;
        tracing::debug!("default address set");
        Ok(address)
    }

    /// Addresses with the default first, then newest first.
    pub async fn list(&self, owner_id: &OwnerId) -> Result<Vec<Address>, CommerceError> {
        Ok(self.book(owner_id).await?.list())
    }

    /// Look up one address.
    pub async fn get(
        &self,
        owner_id: &OwnerId,
        address_id: &AddressId,
    ) -> Result<Address, CommerceError> {
        self.book(owner_id)
            .await?
            .get(address_id)
            .cloned()
            .ok_or_else(|| CommerceError::NotFound(format!("address {address_id}")))
    }

    /// The owner's default address, if any.
    pub async fn default_address(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<Address>, CommerceError> {
        Ok(self.book(owner_id).await?.default_address().cloned())
    }

    /// Apply one change to the owner's book as a single versioned write.
    async fn modify<F>(&self, owner_id: &OwnerId, mut apply: F) -> Result<Address, CommerceError>
    where
        F: FnMut(&mut AddressBook) -> Result<Address, CommerceError> + Send,
    {
        let _guard = self
            .locks
            .acquire(&store_key!(ADDRESS_BOOKS.name(), owner_id))
            .await;
        let (_, address) = ADDRESS_BOOKS
            .update(
                self.store.as_ref(),
                owner_id.as_str(),
                owner_id.as_str(),
                || AddressBook::new(owner_id.clone()),
                |book| apply(book),
            )
            .await?;
        Ok(address)
    }
}
