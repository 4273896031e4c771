//! Checkout commands.

use anyhow::Result;
use folio_commerce::checkout::{CheckoutQuote, PaymentMethod};
use folio_commerce::AddressId;

use super::cart::print_cart;
use super::orders::print_order;
use super::{CheckoutArgs, CheckoutCommand};
use crate::context::Context;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CheckoutCommand::Preview { method } => preview(method, ctx).await,
        CheckoutCommand::Place { method, address } => place(method, address, ctx).await,
    }
}

async fn preview(method: PaymentMethod, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let preview = shop.storefront.checkout.preview(&owner, method).await?;

    if ctx.output.is_json() {
        ctx.output.json(&preview);
        return Ok(());
    }

    print_cart(&preview.cart, ctx);
    if !preview.cart.is_empty() {
        print_quote(&preview.quote, method, ctx);
    }
    Ok(())
}

async fn place(method: PaymentMethod, address: Option<String>, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let address = address.map(AddressId::new);

    let spinner = ctx
        .output
        .spinner(&format!("Processing {} payment...", method));
    let result = shop
        .storefront
        .checkout
        .place_order(&owner, address.as_ref(), method)
        .await;
    spinner.finish_and_clear();
    let order = result?;

    shop.save().await?;

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }

    ctx.output.success(&format!("Order {} placed", order.id));
    print_order(&order, ctx);
    Ok(())
}

fn print_quote(quote: &CheckoutQuote, method: PaymentMethod, ctx: &Context) {
    ctx.output.header(&format!("Charges ({})", method));
    ctx.output.kv("subtotal", &quote.subtotal.to_string());
    if quote.shipping.is_zero() {
        ctx.output.kv("shipping", "free");
    } else {
        ctx.output.kv("shipping", &quote.shipping.to_string());
    }
    ctx.output.kv("tax", &quote.tax.to_string());
    if !quote.cod_charges.is_zero() {
        ctx.output.kv("cod charges", &quote.cod_charges.to_string());
    }
    ctx.output.kv("total", &quote.total.to_string());
}
