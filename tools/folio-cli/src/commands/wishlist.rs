//! Wishlist commands.

use anyhow::Result;
use folio_commerce::wishlist::Wishlist;
use folio_commerce::BookId;

use super::{WishlistArgs, WishlistCommand};
use crate::context::Context;
use crate::output::truncate;

/// Run the wishlist command.
pub async fn run(args: WishlistArgs, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let wishlists = &shop.storefront.wishlists;

    let wishlist = match args.command {
        Some(WishlistCommand::Show) | None => {
            let wishlist = wishlists.get(&owner).await?;
            print_wishlist(&wishlist, ctx);
            return Ok(());
        }
        Some(WishlistCommand::Add { book }) => {
            let wishlist = wishlists.add(&owner, &BookId::new(&book)).await?;
            ctx.output.success(&format!("Saved {}", book));
            wishlist
        }
        Some(WishlistCommand::Remove { book }) => {
            let wishlist = wishlists.remove(&owner, &BookId::new(&book)).await?;
            ctx.output.success(&format!("Removed {}", book));
            wishlist
        }
        Some(WishlistCommand::Move { book }) => {
            let (wishlist, cart) = shop
                .storefront
                .move_to_cart(&owner, &BookId::new(&book))
                .await?;
            ctx.output.success(&format!(
                "Moved {} to the cart ({} items in cart)",
                book,
                cart.item_count()
            ));
            wishlist
        }
        Some(WishlistCommand::Clear) => {
            let wishlist = wishlists.clear(&owner).await?;
            ctx.output.success("Wishlist cleared");
            wishlist
        }
    };

    shop.save().await?;
    if ctx.output.is_json() {
        ctx.output.json(&wishlist);
    }
    Ok(())
}

fn print_wishlist(wishlist: &Wishlist, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(wishlist);
        return;
    }

    if wishlist.is_empty() {
        ctx.output.info("Wishlist is empty");
        return;
    }

    ctx.output.header(&format!(
        "Wishlist for {} ({} books)",
        wishlist.owner_id,
        wishlist.len()
    ));
    let widths = [14, 30, 22, 10, 16];
    ctx.output
        .table_row(&["ID", "TITLE", "AUTHOR", "PRICE", "SAVED"], &widths);
    for line in &wishlist.lines {
        ctx.output.table_row(
            &[
                line.book_id.as_str(),
                &truncate(&line.title, widths[1]),
                &truncate(&line.author, widths[2]),
                &line.price.to_string(),
                &line.added_at.format("%Y-%m-%d %H:%M").to_string(),
            ],
            &widths,
        );
    }
}
