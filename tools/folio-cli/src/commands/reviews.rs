//! Review commands.

use anyhow::Result;
use folio_commerce::{BookId, ReviewId};

use super::{ReviewsArgs, ReviewsCommand};
use crate::context::Context;

/// Run the reviews command.
pub async fn run(args: ReviewsArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.open()?;
    let reviews = &shop.storefront.reviews;

    let review = match args.command {
        ReviewsCommand::List { book } => {
            let list = reviews.list_for_book(&BookId::new(&book)).await?;
            if ctx.output.is_json() {
                ctx.output.json(&list);
                return Ok(());
            }
            if list.is_empty() {
                ctx.output.info(&format!("No reviews for {}", book));
                return Ok(());
            }
            ctx.output.header(&format!("Reviews for {}", book));
            for review in &list {
                ctx.output.list_item(&format!(
                    "{} {} by {} ({})",
                    stars(review.rating),
                    review.id,
                    review.owner_id,
                    review.updated_at.format("%Y-%m-%d")
                ));
                if !review.comment.is_empty() {
                    ctx.output.kv("comment", &review.comment);
                }
            }
            return Ok(());
        }
        ReviewsCommand::Summary { book } => {
            let summary = reviews.summary(&BookId::new(&book)).await?;
            if ctx.output.is_json() {
                ctx.output.json(&summary);
                return Ok(());
            }
            match summary.average {
                Some(average) => ctx.output.info(&format!(
                    "{} averages {:.1} / 5 over {} review(s)",
                    book, average, summary.count
                )),
                None => ctx.output.info(&format!("No reviews for {}", book)),
            }
            return Ok(());
        }
        ReviewsCommand::Add {
            book,
            rating,
            comment,
        } => {
            let owner = ctx.owner()?;
            let review = reviews
                .add(&owner, &BookId::new(&book), rating, comment)
                .await?;
            ctx.output
                .success(&format!("Reviewed {} as {} ({})", book, stars(rating), review.id));
            review
        }
        ReviewsCommand::Update {
            id,
            rating,
            comment,
        } => {
            let owner = ctx.owner()?;
            let review = reviews
                .update(&owner, &ReviewId::new(&id), rating, comment)
                .await?;
            ctx.output.success(&format!("Updated review {}", review.id));
            review
        }
        ReviewsCommand::Remove { id } => {
            let owner = ctx.owner()?;
            let review = reviews.remove(&owner, &ReviewId::new(&id)).await?;
            ctx.output.success(&format!("Removed review {}", review.id));
            review
        }
    };

    shop.save().await?;
    if ctx.output.is_json() {
        ctx.output.json(&review);
    }
    Ok(())
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
    }
}
