//! Book reviews, at most one per owner per book.

mod review;
mod store;

pub use review::{RatingSummary, Review, MAX_RATING, MIN_RATING};
pub use store::{ReviewStore, REVIEWS};
