//! Address book module.
//!
//! Each owner's addresses live in a single document, so every change,
//! including moving the default flag between two addresses, is one
//! compare-and-swap write.

mod address;
mod book;
mod store;

pub use address::{Address, AddressPatch, NewAddress, PostalAddress};
pub use book::AddressBook;
pub use store::{AddressBookStore, ADDRESS_BOOKS};
