//! Commerce error types.

use folio_store::StoreError;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur in storefront operations.
///
/// Every variant is a value-level result; nothing here is retried inside the
/// core. Callers map [`CommerceError::kind`] onto their own transport.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Malformed or out-of-range caller data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Entity absent or not owned by the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Simulated gateway refused or timed out.
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// Catalog provider failure.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Arithmetic overflow in a money calculation.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Document store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of a [`CommerceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    PaymentDeclined,
    UpstreamUnavailable,
    Internal,
}

impl CommerceError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::InvalidInput(_) | CommerceError::Overflow => ErrorKind::InvalidInput,
            CommerceError::NotFound(_) => ErrorKind::NotFound,
            CommerceError::Conflict(_) => ErrorKind::Conflict,
            CommerceError::PaymentDeclined(_) => ErrorKind::PaymentDeclined,
            CommerceError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            CommerceError::Storage(_) | CommerceError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-equivalent status code for the error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInput => 400,
            ErrorKind::PaymentDeclined => 402,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::UpstreamUnavailable => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Whether a caller could reasonably retry the same request.
    ///
    /// The core itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::PaymentDeclined | ErrorKind::UpstreamUnavailable
        )
    }
}

impl From<StoreError> for CommerceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey { .. } => CommerceError::Conflict(e.to_string()),
            StoreError::NotFound { .. } => CommerceError::NotFound(e.to_string()),
            StoreError::Serialization(inner) => CommerceError::Serialization(inner.to_string()),
            other => CommerceError::Storage(other.to_string()),
        }
    }
}

impl From<CatalogError> for CommerceError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(id) => CommerceError::NotFound(format!("book {id}")),
            CatalogError::Unavailable(msg) => CommerceError::UpstreamUnavailable(msg),
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::BookId;

    #[test]
    fn test_status_codes() {
        assert_eq!(CommerceError::InvalidInput("q".into()).status_code(), 400);
        assert_eq!(CommerceError::NotFound("x".into()).status_code(), 404);
        assert_eq!(CommerceError::Conflict("x".into()).status_code(), 409);
        assert_eq!(CommerceError::PaymentDeclined("x".into()).status_code(), 402);
        assert_eq!(CommerceError::UpstreamUnavailable("x".into()).status_code(), 503);
        assert_eq!(CommerceError::Storage("x".into()).status_code(), 500);
    }

    #[test]
    fn test_store_duplicate_maps_to_conflict() {
        let err: CommerceError = StoreError::DuplicateKey {
            collection: "reviews".into(),
            key: "b1:u1".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_catalog_errors_map() {
        let err: CommerceError = CatalogError::NotFound(BookId::new("b1")).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: CommerceError = CatalogError::Unavailable("503".into()).into();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.is_retryable());
    }
}
