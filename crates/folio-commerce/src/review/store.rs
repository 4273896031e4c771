//! Review persistence.

use std::sync::Arc;

use folio_store::{store_key, Collection, DocumentStore, OwnerLocks, Versioned};
use tracing::instrument;

use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId, ReviewId};
use crate::review::{RatingSummary, Review};

/// Reviews keyed by book then owner, which enforces one review per owner
/// per book at the store. See [`review_key`].
pub const REVIEWS: Collection<Review> = Collection::new("reviews");

/// Review store.
#[derive(Clone)]
pub struct ReviewStore {
    store: Arc<dyn DocumentStore>,
    locks: Arc<OwnerLocks>,
}

impl ReviewStore {
    pub fn new(store: Arc<dyn DocumentStore>, locks: Arc<OwnerLocks>) -> Self {
        Self { store, locks }
    }

    /// Review a book. A second review of the same book is a `Conflict`.
    #[instrument(skip(self, comment), fields(owner = %owner_id, book = %book_id))]
    pub async fn add(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<Review, CommerceError> {
        let review = Review::new(owner_id.clone(), book_id.clone(), rating, comment.into())?;
        REVIEWS
            .insert(
                self.store.as_ref(),
                &review_key(book_id, owner_id),
                owner_id.as_str(),
                &review,
            )
            .await
            .map_err(|e| match CommerceError::from(e) {
                CommerceError::Conflict(_) => {
                    CommerceError::Conflict(format!("book {book_id} already reviewed"))
                }
                other => other,
            })?;
        tracing::debug!(review = %review.id, rating, "review added");
        Ok(review)
    }

    /// Change a review's rating and comment.
    #[instrument(skip(self, comment), fields(owner = %owner_id, review = %review_id))]
    pub async fn update(
        &self,
        owner_id: &OwnerId,
        review_id: &ReviewId,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<Review, CommerceError> {
        let _guard = self.lock(owner_id).await;
        let current = self.find(owner_id, review_id).await?;

        let mut review = current.value;
        review.edit(rating, comment.into())?;
        REVIEWS
            .replace(self.store.as_ref(), &current.key, current.version, &review)
            .await?;
        tracing::debug!("review updated");
        Ok(review)
    }

    /// Delete a review.
    #[instrument(skip(self), fields(owner = %owner_id, review = %review_id))]
    pub async fn remove(
        &self,
        owner_id: &OwnerId,
        review_id: &ReviewId,
    ) -> Result<Review, CommerceError> {
        let _guard = self.lock(owner_id).await;
        let current = self.find(owner_id, review_id).await?;
        REVIEWS.delete(self.store.as_ref(), &current.key).await?;
        tracing::debug!("review removed");
        Ok(current.value)
    }

    /// Reviews of a book, newest first.
    pub async fn list_for_book(&self, book_id: &BookId) -> Result<Vec<Review>, CommerceError> {
        let mut reviews: Vec<Review> = REVIEWS
            .list_by_prefix(self.store.as_ref(), &book_prefix(book_id))
            .await?
            .into_iter()
            .map(|v| v.into_inner())
            .filter(|r| &r.book_id == book_id)
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    /// The owner's review of a book, if any.
    pub async fn for_owner(
        &self,
        owner_id: &OwnerId,
        book_id: &BookId,
    ) -> Result<Option<Review>, CommerceError> {
        Ok(REVIEWS
            .get(self.store.as_ref(), &review_key(book_id, owner_id))
            .await?
            .map(|v| v.into_inner()))
    }

    /// Review count and average rating for a book.
    pub async fn summary(&self, book_id: &BookId) -> Result<RatingSummary, CommerceError> {
        let reviews = self.list_for_book(book_id).await?;
        Ok(RatingSummary::of(&reviews))
    }

    async fn find(
        &self,
        owner_id: &OwnerId,
        review_id: &ReviewId,
    ) -> Result<Versioned<Review>, CommerceError> {
        REVIEWS
            .list_by_owner(self.store.as_ref(), owner_id.as_str())
            .await?
            .into_iter()
            .find(|v| &v.value.id == review_id)
            .ok_or_else(|| CommerceError::NotFound(format!("review {review_id}")))
    }

    async fn lock(&self, owner_id: &OwnerId) -> tokio::sync::OwnedMutexGuard<()> {
        self.locks
            .acquire(&store_key!(REVIEWS.name(), owner_id))
            .await
    }
}

/// `<book length>:<book>:`, so no book's prefix is a prefix of another's
/// even when IDs contain ':'.
fn book_prefix(book_id: &BookId) -> String {
    format!("{}:{}:", book_id.as_str().len(), book_id)
}

fn review_key(book_id: &BookId, owner_id: &OwnerId) -> String {
    format!("{}{}", book_prefix(book_id), owner_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_store::MemoryStore;

    fn reviews() -> ReviewStore {
        ReviewStore::new(Arc::new(MemoryStore::new()), Arc::new(OwnerLocks::new()))
    }

    #[tokio::test]
    async fn test_one_review_per_owner_per_book() {
        let store = reviews();
        let owner = OwnerId::new("u1");
        let book = BookId::new("b1");
        store.add(&owner, &book, 4, "Good").await.unwrap();

        let err = store.add(&owner, &book, 5, "Again").await.unwrap_err();
        assert!(matches!(err, CommerceError::Conflict(_)));

        store.add(&OwnerId::new("u2"), &book, 2, "Meh").await.unwrap();
        let summary = store.summary(&book).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, Some(3.0));
    }

    #[tokio::test]
    async fn test_update_and_remove_are_owner_scoped() {
        let store = reviews();
        let owner = OwnerId::new("u1");
        let book = BookId::new("b1");
        let review = store.add(&owner, &book, 3, "Fine").await.unwrap();

        let err = store
            .update(&OwnerId::new("u2"), &review.id, 1, "Hijack")
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound(_)));

        let updated = store.update(&owner, &review.id, 5, "Great").await.unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(
            store.for_owner(&owner, &book).await.unwrap().unwrap().comment,
            "Great"
        );

        store.remove(&owner, &review.id).await.unwrap();
        assert!(store.list_for_book(&book).await.unwrap().is_empty());
        assert!(store.remove(&owner, &review.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_is_per_book() {
        let store = reviews();
        let owner = OwnerId::new("u1");
        store.add(&owner, &BookId::new("b1"), 4, "").await.unwrap();
        store.add(&owner, &BookId::new("b10"), 2, "").await.unwrap();

        let b1 = store.list_for_book(&BookId::new("b1")).await.unwrap();
        assert_eq!(b1.len(), 1);
        assert_eq!(b1[0].rating, 4);
    }

    #[tokio::test]
    async fn test_ids_with_separators_do_not_collide() {
        let store = reviews();
        let first = store
            .add(&OwnerId::new("c"), &BookId::new("a:b"), 5, "")
            .await
            .unwrap();
        let second = store
            .add(&OwnerId::new("b:c"), &BookId::new("a"), 1, "")
            .await
            .unwrap();

        let ab = store.list_for_book(&BookId::new("a:b")).await.unwrap();
        assert_eq!(ab.len(), 1);
        assert_eq!(ab[0].id, first.id);

        let a = store.list_for_book(&BookId::new("a")).await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].id, second.id);

        assert_ne!(
            review_key(&BookId::new("a:b"), &OwnerId::new("c")),
            review_key(&BookId::new("a"), &OwnerId::new("b:c"))
        );
    }
}
