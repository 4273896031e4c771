//! Cart commands.

use anyhow::Result;
use folio_commerce::cart::PricedCart;
use folio_commerce::BookId;

use super::{CartArgs, CartCommand};
use crate::context::{Context, Shop};
use crate::output::truncate;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let carts = &shop.storefront.carts;

    match args.command {
        Some(CartCommand::Show) | None => return show(&shop, ctx).await,
        Some(CartCommand::Add { book, quantity }) => {
            let cart = carts.add_item(&owner, &BookId::new(&book), quantity).await?;
            let line = cart.line(&BookId::new(&book)).map_or(0, |l| l.quantity);
            ctx.output
                .success(&format!("Added {} x {} (now {} in cart)", quantity, book, line));
        }
        Some(CartCommand::Set { book, quantity }) => {
            carts
                .set_quantity(&owner, &BookId::new(&book), quantity)
                .await?;
            ctx.output.success(&format!("Set {} to {}", book, quantity));
        }
        Some(CartCommand::Remove { book }) => {
            carts.remove_item(&owner, &BookId::new(&book)).await?;
            ctx.output.success(&format!("Removed {}", book));
        }
        Some(CartCommand::Clear) => {
            carts.clear(&owner).await?;
            ctx.output.success("Cart cleared");
        }
    }

    shop.save().await?;
    if ctx.output.is_json() {
        let priced = carts.price_cart(&owner).await?;
        ctx.output.json(&priced);
    }
    Ok(())
}

async fn show(shop: &Shop, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let priced = shop.storefront.carts.price_cart(&owner).await?;

    if ctx.output.is_json() {
        ctx.output.json(&priced);
        return Ok(());
    }

    print_cart(&priced, ctx);
    Ok(())
}

/// Print a priced cart as a table.
pub fn print_cart(priced: &PricedCart, ctx: &Context) {
    if priced.is_empty() {
        ctx.output.info("Cart is empty");
        return;
    }

    ctx.output
        .header(&format!("Cart for {} ({} items)", priced.owner_id, priced.item_count()));
    let widths = [14, 30, 5, 10, 11];
    ctx.output
        .table_row(&["ID", "TITLE", "QTY", "PRICE", "SUBTOTAL"], &widths);
    for line in &priced.lines {
        ctx.output.table_row(
            &[
                line.book_id.as_str(),
                &truncate(&line.title, widths[1]),
                &line.quantity.to_string(),
                &line.price.to_string(),
                &line.subtotal.to_string(),
            ],
            &widths,
        );
    }
    ctx.output.kv("total", &priced.total.to_string());

    for line in priced.unavailable() {
        ctx.output.warn(&format!(
            "{} could not be priced ({}); remove it before checkout",
            line.book_id, line.title
        ));
    }
}
