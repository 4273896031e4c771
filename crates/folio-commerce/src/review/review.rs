//! Review types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId, ReviewId};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A shopper's review of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub owner_id: OwnerId,
    /// Stars, 1 to 5.
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub(crate) fn new(
        owner_id: OwnerId,
        book_id: BookId,
        rating: u8,
        comment: String,
    ) -> Result<Self, CommerceError> {
        validate_rating(rating)?;
        let now = Utc::now();
        Ok(Self {
            id: ReviewId::generate(),
            book_id,
            owner_id,
            rating,
            comment: comment.trim().to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub(crate) fn edit(&mut self, rating: u8, comment: String) -> Result<(), CommerceError> {
        validate_rating(rating)?;
        self.rating = rating;
        self.comment = comment.trim().to_string();
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_rating(rating: u8) -> Result<(), CommerceError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CommerceError::InvalidInput(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}

/// Aggregate rating for a book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub count: usize,
    /// Mean rating, `None` without reviews.
    pub average: Option<f64>,
}

impl RatingSummary {
    /// Summarize a set of reviews.
    pub fn of<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let (count, sum) = reviews
            .into_iter()
            .fold((0usize, 0u64), |(n, s), r| (n + 1, s + u64::from(r.rating)));
        Self {
            count,
            average: (count > 0).then(|| sum as f64 / count as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let owner = OwnerId::new("u1");
        let book = BookId::new("b1");
        assert!(Review::new(owner.clone(), book.clone(), 0, String::new()).is_err());
        assert!(Review::new(owner.clone(), book.clone(), 6, String::new()).is_err());
        let review = Review::new(owner, book, 5, "  Loved it ".into()).unwrap();
        assert_eq!(review.comment, "Loved it");
    }

    #[test]
    fn test_summary() {
        let owner = OwnerId::new("u1");
        let reviews: Vec<_> = [4, 5, 3]
            .into_iter()
            .map(|r| Review::new(owner.clone(), BookId::new("b1"), r, String::new()).unwrap())
            .collect();

        let summary = RatingSummary::of(&reviews);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(4.0));
        assert_eq!(RatingSummary::of(&Vec::<Review>::new()).average, None);
    }
}
