//! The per-owner address book document.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::address::{Address, AddressPatch, NewAddress};
use crate::error::CommerceError;
use crate::ids::{AddressId, OwnerId};

/// All of one owner's addresses.
///
/// Invariant: when `addresses` is non-empty exactly one entry is default.
/// Every method either keeps the invariant or returns an error without
/// changing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressBook {
    pub owner_id: OwnerId,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub next_seq: u64,
}

impl AddressBook {
    /// Create an empty book.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            addresses: Vec::new(),
            next_seq: 0,
        }
    }

    /// Add an address.
    ///
    /// The first address is always the default. A later address flagged as
    /// default takes the flag from the current one.
    pub fn add(&mut self, new: NewAddress) -> Result<Address, CommerceError> {
        new.postal.validate()?;

        let make_default = new.is_default || self.addresses.is_empty();
        if make_default {
            for address in &mut self.addresses {
                address.is_default = false;
            }
        }

        let address = Address {
            id: AddressId::generate(),
            owner_id: self.owner_id.clone(),
            postal: new.postal,
            is_default: make_default,
            seq: self.next_seq,
            created_at: Utc::now(),
        };
        self.next_seq += 1;
        self.addresses.push(address.clone());
        Ok(address)
    }

    /// Apply a patch to an address.
    ///
    /// `is_default: Some(false)` on the current default hands the flag to the
    /// oldest other address; a lone address stays default.
    pub fn update(&mut self, id: &AddressId, patch: &AddressPatch) -> Result<Address, CommerceError> {
        let index = self.index_of(id)?;

        let mut postal = self.addresses[index].postal.clone();
        patch.apply_fields(&mut postal);
        postal.validate()?;
        self.addresses[index].postal = postal;

        match patch.is_default {
            Some(true) => self.make_default(index),
            Some(false) if self.addresses[index].is_default => {
                if let Some(heir) = self.oldest_except(index) {
                    self.make_default(heir);
                }
            }
            _ => {}
        }

        Ok(self.addresses[index].clone())
    }

    /// Remove an address, promoting the oldest remaining one if the default
    /// was removed.
    pub fn remove(&mut self, id: &AddressId) -> Result<Address, CommerceError> {
        let index = self.index_of(id)?;
        let removed = self.addresses.remove(index);

        if removed.is_default {
            if let Some(heir) = self.oldest_except(usize::MAX) {
                self.make_default(heir);
            }
        }
        Ok(removed)
    }

    /// Make an address the default.
    pub fn set_default(&mut self, id: &AddressId) -> Result<Address, CommerceError> {
        let index = self.index_of(id)?;
        self.make_default(index);
        Ok(self.addresses[index].clone())
    }

    /// Addresses with the default first, then newest first.
    pub fn list(&self) -> Vec<Address> {
        let mut addresses = self.addresses.clone();
        addresses.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        addresses
    }

    /// Look up an address.
    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| &a.id == id)
    }

    /// The default address, if any address exists.
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    /// Number of addresses.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Check if the book is empty.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    fn index_of(&self, id: &AddressId) -> Result<usize, CommerceError> {
        self.addresses
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| CommerceError::NotFound(format!("address {id}")))
    }

    fn make_default(&mut self, index: usize) {
        for (i, address) in self.addresses.iter_mut().enumerate() {
            address.is_default = i == index;
        }
    }

    fn oldest_except(&self, skip: usize) -> Option<usize> {
        self.addresses
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .min_by_key(|(_, a)| a.seq)
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::PostalAddress;

    fn new_address(name: &str) -> NewAddress {
        NewAddress::new(PostalAddress::new(
            name,
            "12 MG Road",
            "Pune",
            "MH",
            "411001",
            "9800000000",
        ))
    }

    fn book() -> AddressBook {
        AddressBook::new(OwnerId::new("u1"))
    }

    fn defaults(book: &AddressBook) -> usize {
        book.addresses.iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn test_first_address_is_default() {
        let mut book = book();
        let a = book.add(new_address("A")).unwrap();
        assert!(a.is_default);

        let b = book.add(new_address("B")).unwrap();
        assert!(!b.is_default);
        assert_eq!(book.default_address().unwrap().id, a.id);
    }

    #[test]
    fn test_new_default_replaces_old() {
        let mut book = book();
        let a = book.add(new_address("A").as_default()).unwrap();
        let b = book.add(new_address("B").as_default()).unwrap();

        assert_eq!(book.default_address().unwrap().id, b.id);
        assert!(!book.get(&a.id).unwrap().is_default);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_incomplete_address_rejected() {
        let mut book = book();
        let mut new = new_address("A");
        new.postal.street.clear();
        assert!(matches!(book.add(new), Err(CommerceError::InvalidInput(_))));
        assert!(book.is_empty());
        assert_eq!(book.next_seq, 0);
    }

    #[test]
    fn test_remove_default_promotes_oldest() {
        let mut book = book();
        let a = book.add(new_address("A")).unwrap();
        let b = book.add(new_address("B")).unwrap();
        let c = book.add(new_address("C")).unwrap();
        book.set_default(&c.id).unwrap();

        book.remove(&c.id).unwrap();
        assert_eq!(book.default_address().unwrap().id, a.id);
        assert!(!book.get(&b.id).unwrap().is_default);

        book.remove(&a.id).unwrap();
        book.remove(&b.id).unwrap();
        assert!(book.is_empty());
        assert!(book.default_address().is_none());
    }

    #[test]
    fn test_remove_missing_address() {
        let mut book = book();
        let err = book.remove(&AddressId::new("nope")).unwrap_err();
        assert!(matches!(err, CommerceError::NotFound(_)));
    }

    #[test]
    fn test_update_default_flag() {
        let mut book = book();
        let a = book.add(new_address("A")).unwrap();
        let b = book.add(new_address("B")).unwrap();

        let patch = AddressPatch {
            is_default: Some(true),
            ..Default::default()
        };
        book.update(&b.id, &patch).unwrap();
        assert_eq!(book.default_address().unwrap().id, b.id);

        let demote = AddressPatch {
            is_default: Some(false),
            ..Default::default()
        };
        book.update(&b.id, &demote).unwrap();
        assert_eq!(book.default_address().unwrap().id, a.id);
        assert_eq!(defaults(&book), 1);
    }

    #[test]
    fn test_lone_address_stays_default() {
        let mut book = book();
        let a = book.add(new_address("A")).unwrap();
        let demote = AddressPatch {
            is_default: Some(false),
            ..Default::default()
        };
        let updated = book.update(&a.id, &demote).unwrap();
        assert!(updated.is_default);
    }

    #[test]
    fn test_list_order() {
        let mut book = book();
        let a = book.add(new_address("A")).unwrap();
        let b = book.add(new_address("B")).unwrap();
        let c = book.add(new_address("C")).unwrap();

        let ids: Vec<_> = book.list().into_iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![a.id, c.id, b.id]);
    }
}
