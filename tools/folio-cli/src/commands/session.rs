//! Signed-out cache and sign-in merge.
//!
//! The cache file plays the part of a browser's local storage: books added
//! here stay on this machine until `folio session login` pushes them into
//! the shopper's account.

use std::sync::Arc;

use anyhow::Result;
use folio_commerce::sync::{ClientSession, SessionState, SyncReport};
use folio_commerce::BookId;

use super::{SessionArgs, SessionCommand};
use crate::context::Context;

/// Run the session command.
pub async fn run(args: SessionArgs, ctx: &Context) -> Result<()> {
    match args.command {
        Some(SessionCommand::Show) | None => {
            let cache = ctx.load_cache()?;
            print_state(&cache, ctx);
            Ok(())
        }
        Some(SessionCommand::Add { book, quantity }) => add(&book, quantity, ctx).await,
        Some(SessionCommand::Save { book }) => save(&book, ctx).await,
        Some(SessionCommand::Login) => login(ctx).await,
        Some(SessionCommand::Reset) => {
            ctx.save_cache(&SessionState::default())?;
            ctx.output.success("Signed-out cache discarded");
            Ok(())
        }
    }
}

async fn add(book: &str, quantity: i64, ctx: &Context) -> Result<()> {
    let shop = ctx.open()?;
    let mut session =
        ClientSession::with_cache(Arc::new(shop.storefront.clone()), ctx.load_cache()?);

    let state = session.add_to_cart(&BookId::new(book), quantity).await?;
    ctx.save_cache(state)?;
    ctx.output.success(&format!(
        "Added {} x {} to the signed-out cart ({} items)",
        quantity,
        book,
        state.cart_item_count()
    ));
    Ok(())
}

async fn save(book: &str, ctx: &Context) -> Result<()> {
    let shop = ctx.open()?;
    let snapshot = shop.storefront.book(&BookId::new(book)).await?;
    let mut session =
        ClientSession::with_cache(Arc::new(shop.storefront.clone()), ctx.load_cache()?);

    let state = session.add_to_wishlist(snapshot).await?;
    ctx.save_cache(state)?;
    ctx.output
        .success(&format!("Saved {} to the signed-out wishlist", book));
    Ok(())
}

async fn login(ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let mut session =
        ClientSession::with_cache(Arc::new(shop.storefront.clone()), ctx.load_cache()?);

    let report = session.login(owner.clone()).await?;
    shop.save().await?;
    // Everything in the cache has been offered to the server exactly once.
    ctx.save_cache(&SessionState::default())?;

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    ctx.output.success(&format!("Signed in as {}", owner));
    print_report(&report, ctx);
    print_state(session.state(), ctx);
    Ok(())
}

fn print_report(report: &SyncReport, ctx: &Context) {
    ctx.output.kv("pushed", &report.pushed.len().to_string());
    if !report.overlapping.is_empty() {
        let books: Vec<&str> = report.overlapping.iter().map(|b| b.as_str()).collect();
        ctx.output
            .kv("kept account copy of", &books.join(", "));
    }
    for failed in &report.failed {
        ctx.output.warn(&format!(
            "Could not add {}: {}",
            failed.op.book_id(),
            failed.error
        ));
    }
}

fn print_state(state: &SessionState, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(state);
        return;
    }

    ctx.output.header("Cart");
    if state.cart.is_empty() {
        ctx.output.info("empty");
    }
    for line in &state.cart {
        ctx.output
            .list_item(&format!("{} x {}", line.book_id, line.quantity));
    }

    ctx.output.header("Wishlist");
    if state.wishlist.is_empty() {
        ctx.output.info("empty");
    }
    for line in &state.wishlist {
        ctx.output
            .list_item(&format!("{} ({}, {})", line.title, line.book_id, line.price));
    }
}
