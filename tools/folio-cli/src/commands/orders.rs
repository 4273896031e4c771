//! Order commands.

use anyhow::{bail, Result};
use folio_commerce::checkout::{Order, OrderStatus};
use folio_commerce::OrderId;
use serde::Serialize;

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;
use crate::output::{payment_badge, status_badge, truncate};

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    match args.command {
        Some(OrdersCommand::List) | None => list_orders(args.limit, ctx).await,
        Some(OrdersCommand::Show { id }) => show_order(&id, ctx).await,
        Some(OrdersCommand::Advance { id, status }) => advance_order(&id, status, ctx).await,
        Some(OrdersCommand::Cancel { id }) => {
            advance_order(&id, Some(OrderStatus::Cancelled), ctx).await
        }
    }
}

/// Row shown by `orders list`.
#[derive(Debug, Serialize)]
struct OrderSummary {
    id: String,
    created_at: String,
    items: i64,
    total: String,
    payment: String,
    status: OrderStatus,
}

async fn list_orders(limit: Option<usize>, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let mut orders = shop.storefront.orders.list_orders(&owner).await?;

    // Apply limit
    if let Some(limit) = limit {
        orders.truncate(limit);
    }

    if ctx.output.is_json() {
        let summaries: Vec<OrderSummary> = orders
            .iter()
            .map(|o| OrderSummary {
                id: o.id.to_string(),
                created_at: o.created_at.to_rfc3339(),
                items: o.item_count(),
                total: o.total.to_string(),
                payment: o.payment_method.to_string(),
                status: o.status,
            })
            .collect();
        ctx.output.json(&summaries);
        return Ok(());
    }

    if orders.is_empty() {
        ctx.output.info(&format!("No orders for {}", owner));
        return Ok(());
    }

    ctx.output.header(&format!("Orders for {}", owner));
    let widths = [20, 17, 6, 12, 11, 10];
    ctx.output.table_row(
        &["ID", "PLACED", "ITEMS", "TOTAL", "PAYMENT", "STATUS"],
        &widths,
    );
    for order in &orders {
        ctx.output.table_row(
            &[
                order.id.as_str(),
                &order.created_at.format("%Y-%m-%d %H:%M").to_string(),
                &order.item_count().to_string(),
                &order.total.to_string(),
                order.payment_method.as_str(),
                &status_badge(order.status),
            ],
            &widths,
        );
    }

    Ok(())
}

async fn show_order(id: &str, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let order = shop
        .storefront
        .orders
        .get_order(&owner, &OrderId::new(id))
        .await?;

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }

    print_order(&order, ctx);
    Ok(())
}

async fn advance_order(id: &str, status: Option<OrderStatus>, ctx: &Context) -> Result<()> {
    let owner = ctx.owner()?;
    let shop = ctx.open()?;
    let order_id = OrderId::new(id);
    let orders = &shop.storefront.orders;

    let target = match status {
        Some(status) => status,
        None => {
            let current = orders.get_order(&owner, &order_id).await?.status;
            match current.next() {
                Some(next) => next,
                None => bail!("Order {} is {} and cannot move further", id, current),
            }
        }
    };

    let order = if target == OrderStatus::Cancelled {
        orders.cancel(&owner, &order_id).await?
    } else {
        orders.advance_status(&owner, &order_id, target).await?
    };
    shop.save().await?;

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }

    ctx.output
        .success(&format!("Order {} is now {}", order.id, status_badge(order.status)));
    Ok(())
}

/// Print one order in full.
pub fn print_order(order: &Order, ctx: &Context) {
    ctx.output.header(&format!("Order {}", order.id));
    ctx.output
        .kv("placed", &order.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    ctx.output.kv("status", &status_badge(order.status));
    ctx.output.kv(
        "payment",
        &format!("{} ({})", order.payment_method, payment_badge(order.payment_status)),
    );
    ctx.output.kv("ship to", &order.shipping_address.one_line());

    ctx.output.header("Items");
    let widths = [14, 30, 5, 10];
    for item in &order.items {
        ctx.output.table_row(
            &[
                item.book_id.as_str(),
                &truncate(&item.title, widths[1]),
                &item.quantity.to_string(),
                &item.price.to_string(),
            ],
            &widths,
        );
    }

    ctx.output.header("Charges");
    ctx.output.kv("subtotal", &order.subtotal.to_string());
    ctx.output.kv("shipping", &order.shipping.to_string());
    ctx.output.kv("tax", &order.tax.to_string());
    if !order.cod_charges.is_zero() {
        ctx.output.kv("cod charges", &order.cod_charges.to_string());
    }
    ctx.output.kv("total", &order.total.to_string());
}
