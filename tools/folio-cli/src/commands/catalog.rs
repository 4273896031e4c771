//! Catalog commands.

use anyhow::Result;
use folio_commerce::catalog::BookSnapshot;
use folio_commerce::review::RatingSummary;
use folio_commerce::BookId;
use serde::Serialize;

use super::{CatalogArgs, CatalogCommand};
use crate::context::Context;
use crate::output::truncate;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CatalogCommand::Search { query } => search(&query, ctx).await,
        CatalogCommand::Show { book } => show(&book, ctx).await,
    }
}

async fn search(query: &str, ctx: &Context) -> Result<()> {
    let shop = ctx.open()?;
    let books = shop.storefront.search(query).await?;

    if ctx.output.is_json() {
        ctx.output.json(&books);
        return Ok(());
    }

    if books.is_empty() {
        ctx.output.info(&format!("No books match '{}'", query));
        return Ok(());
    }

    ctx.output.header(&format!("{} book(s)", books.len()));
    let widths = [14, 32, 22, 10];
    ctx.output.table_row(&["ID", "TITLE", "AUTHOR", "PRICE"], &widths);
    for book in &books {
        ctx.output.table_row(
            &[
                book.book_id.as_str(),
                &truncate(&book.title, widths[1]),
                &truncate(&book.author, widths[2]),
                &book.price.to_string(),
            ],
            &widths,
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct BookDetail<'a> {
    #[serde(flatten)]
    book: &'a BookSnapshot,
    rating: &'a RatingSummary,
}

async fn show(book_id: &str, ctx: &Context) -> Result<()> {
    let shop = ctx.open()?;
    let book_id = BookId::new(book_id);
    let book = shop.storefront.book(&book_id).await?;
    let summary = shop.storefront.reviews.summary(&book_id).await?;

    if ctx.output.is_json() {
        ctx.output.json(&BookDetail {
            book: &book,
            rating: &summary,
        });
        return Ok(());
    }

    ctx.output.header(&book.title);
    ctx.output.kv("id", book.book_id.as_str());
    ctx.output.kv("author", &book.author);
    ctx.output.kv("price", &book.price.to_string());
    if let Some(ref thumbnail) = book.thumbnail {
        ctx.output.kv("cover", thumbnail);
    }
    match summary.average {
        Some(average) => ctx
            .output
            .kv("rating", &format!("{:.1} / 5 ({} reviews)", average, summary.count)),
        None => ctx.output.kv("rating", "no reviews yet"),
    }

    Ok(())
}
