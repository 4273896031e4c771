//! Address types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{AddressId, OwnerId};

/// A postal address without any address-book bookkeeping.
///
/// Orders keep a copy of this, never a reference to a saved address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    /// Recipient name.
    pub name: String,
    /// Street and house number.
    pub street: String,
    pub city: String,
    pub state: String,
    /// PIN / ZIP code.
    pub postal_code: String,
    pub phone: String,
}

impl PostalAddress {
    /// Create an address.
    pub fn new(
        name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            phone: phone.into(),
        }
    }

    /// Names of fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Check that every field is filled in.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fail with `InvalidInput` naming the blank fields.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::InvalidInput(format!(
                "address is missing: {}",
                missing.join(", ")
            )))
        }
    }

    /// Format as a single line.
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {}, {} {}",
            self.name, self.street, self.city, self.state, self.postal_code
        )
    }
}

/// A saved address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub postal: PostalAddress,
    pub is_default: bool,
    /// Creation order within the owner's book.
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}

/// Input for adding an address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    #[serde(flatten)]
    pub postal: PostalAddress,
    #[serde(default)]
    pub is_default: bool,
}

impl NewAddress {
    /// Wrap a postal address.
    pub fn new(postal: PostalAddress) -> Self {
        Self {
            postal,
            is_default: false,
        }
    }

    /// Request that the address become the default.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Partial update of a saved address. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressPatch {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub is_default: Option<bool>,
}

impl AddressPatch {
    /// Apply the field changes. The default flag is handled by the book.
    pub(crate) fn apply_fields(&self, postal: &mut PostalAddress) {
        let fields = [
            (&self.name, &mut postal.name),
            (&self.street, &mut postal.street),
            (&self.city, &mut postal.city),
            (&self.state, &mut postal.state),
            (&self.postal_code, &mut postal.postal_code),
            (&self.phone, &mut postal.phone),
        ];
        for (patch, target) in fields {
            if let Some(value) = patch {
                *target = value.clone();
            }
        }
    }
}
