mod common;

use std::sync::Arc;

use common::{address, flaky_storefront, storefront, FlakyStore};
use folio_commerce::address::AddressPatch;
use folio_commerce::checkout::{PaymentOutcome, ScriptedBehavior};
use folio_commerce::prelude::*;

fn defaults(addresses: &[Address]) -> usize {
    addresses.iter().filter(|a| a.is_default).count()
}

#[tokio::test]
async fn at_most_one_default_address_through_any_sequence() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");
    let book = &shop.addresses;

    let a = book.add(&owner, address("A")).await.unwrap();
    assert_eq!(defaults(&book.list(&owner).await.unwrap()), 1);

    let b = book.add(&owner, address("B").as_default()).await.unwrap();
    let c = book.add(&owner, address("C")).await.unwrap();
    assert_eq!(defaults(&book.list(&owner).await.unwrap()), 1);

    book.set_default(&owner, &c.id).await.unwrap();
    assert_eq!(defaults(&book.list(&owner).await.unwrap()), 1);

    let demote = AddressPatch {
        is_default: Some(false),
        ..Default::default()
    };
    book.update(&owner, &c.id, demote).await.unwrap();
    let list = book.list(&owner).await.unwrap();
    assert_eq!(defaults(&list), 1);
    assert_eq!(list[0].id, a.id);

    book.remove(&owner, &a.id).await.unwrap();
    assert_eq!(defaults(&book.list(&owner).await.unwrap()), 1);

    book.remove(&owner, &b.id).await.unwrap();
    book.remove(&owner, &c.id).await.unwrap();
    assert!(book.list(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn second_default_address_takes_over() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");

    let a = shop.addresses.add(&owner, address("A").as_default()).await.unwrap();
    let b = shop.addresses.add(&owner, address("B").as_default()).await.unwrap();

    let default = shop.addresses.default_address(&owner).await.unwrap().unwrap();
    assert_eq!(default.id, b.id);
    assert!(!shop.addresses.get(&owner, &a.id).await.unwrap().is_default);
}

#[tokio::test]
async fn removing_sole_default_promotes_earlier_address() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");

    let earlier = shop.addresses.add(&owner, address("Earlier")).await.unwrap();
    let later = shop.addresses.add(&owner, address("Later").as_default()).await.unwrap();

    shop.addresses.remove(&owner, &later.id).await.unwrap();
    let list = shop.addresses.list(&owner).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, earlier.id);
    assert!(list[0].is_default);
}

#[tokio::test]
async fn adding_same_book_twice_yields_one_line() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");
    let book = BookId::new("book1");

    shop.carts.add_item(&owner, &book, 1).await.unwrap();
    let cart = shop.carts.add_item(&owner, &book, 4).await.unwrap();

    assert_eq!(cart.lines, vec![CartLine::new("book1", 5)]);
}

#[tokio::test]
async fn set_quantity_replaces_rather_than_adds() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");
    let book = BookId::new("book1");

    shop.carts.add_item(&owner, &book, 2).await.unwrap();
    let cart = shop.carts.set_quantity(&owner, &book, 5).await.unwrap();

    assert_eq!(cart.lines, vec![CartLine::new("book1", 5)]);
}

#[tokio::test]
async fn move_to_cart_leaves_wishlist_when_cart_add_fails() {
    let store = Arc::new(FlakyStore::default());
    let shop = flaky_storefront(store.clone());
    let owner = OwnerId::new("u1");
    let book = BookId::new("book1");
    shop.wishlists.add(&owner, &book).await.unwrap();

    store.fail_writes("carts", true);
    assert!(shop.move_to_cart(&owner, &book).await.is_err());

    assert!(shop.wishlists.get(&owner).await.unwrap().contains(&book));
    assert!(shop.carts.get(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn move_to_cart_undoes_cart_add_when_wishlist_removal_fails() {
    let store = Arc::new(FlakyStore::default());
    let shop = flaky_storefront(store.clone());
    let owner = OwnerId::new("u1");
    let book = BookId::new("book1");
    shop.carts.add_item(&owner, &book, 2).await.unwrap();
    shop.wishlists.add(&owner, &book).await.unwrap();

    store.fail_writes("wishlists", true);
    assert!(shop.move_to_cart(&owner, &book).await.is_err());

    assert!(shop.wishlists.get(&owner).await.unwrap().contains(&book));
    assert_eq!(
        shop.carts.get(&owner).await.unwrap().lines,
        vec![CartLine::new("book1", 2)]
    );

    store.fail_writes("wishlists", false);
    let (wishlist, cart) = shop.move_to_cart(&owner, &book).await.unwrap();
    assert!(wishlist.is_empty());
    assert_eq!(cart.lines, vec![CartLine::new("book1", 3)]);
}

#[tokio::test]
async fn order_totals_always_add_up() {
    let gateway = ScriptedGateway::new(ScriptedBehavior::Approve).with_outcomes([
        PaymentOutcome::Failed("first attempt".into()),
    ]);
    let shop = storefront(Arc::new(gateway));
    let owner = OwnerId::new("u1");
    shop.addresses.add(&owner, address("Home")).await.unwrap();

    let carts = [
        vec![("book1", 1)],
        vec![("book2", 2), ("book3", 1)],
        vec![("book2", 1)],
    ];
    let methods = [PaymentMethod::Cod, PaymentMethod::Card, PaymentMethod::Upi];

    for (lines, method) in carts.iter().zip(methods) {
        for (book, quantity) in lines {
            shop.carts
                .add_item(&owner, &BookId::new(*book), *quantity)
                .await
                .unwrap();
        }
        // The one scripted decline leaves the cart for a retry.
        let order = match shop.checkout.place_order(&owner, None, method).await {
            Ok(order) => order,
            Err(CommerceError::PaymentDeclined(_)) => shop
                .checkout
                .place_order(&owner, None, method)
                .await
                .unwrap(),
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(
            order.total,
            order.subtotal + order.shipping + order.tax + order.cod_charges
        );
    }

    let orders = shop.orders.list_orders(&owner).await.unwrap();
    assert_eq!(orders.len(), 3);
    for order in orders {
        assert_eq!(
            order.total,
            order.subtotal + order.shipping + order.tax + order.cod_charges
        );
    }
}

#[tokio::test]
async fn create_order_rejects_inconsistent_totals() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");
    let request = OrderRequest {
        items: vec![OrderItem {
            book_id: BookId::new("book1"),
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            price: Money::from_major(399),
            quantity: 1,
            thumbnail: None,
        }],
        shipping_address: address("Home").postal,
        payment_method: PaymentMethod::Card,
        subtotal: Money::from_major(399),
        shipping: Money::from_major(50),
        tax: Money::new(7200),
        cod_charges: Money::zero(),
        total: Money::from_major(1),
    };

    let err = shop.orders.create_order(&owner, request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(shop.orders.list_orders(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn cod_is_confirmed_whatever_the_gateway_does() {
    for gateway in [
        ScriptedGateway::declining(),
        ScriptedGateway::hanging(),
        ScriptedGateway::approving(),
    ] {
        let gateway = Arc::new(gateway);
        let shop = storefront(gateway.clone());
        let owner = OwnerId::new("u1");
        shop.addresses.add(&owner, address("Home")).await.unwrap();
        shop.carts
            .add_item(&owner, &BookId::new("book2"), 1)
            .await
            .unwrap();

        let order = shop
            .checkout
            .place_order(&owner, None, PaymentMethod::Cod)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(gateway.calls(), 0);
    }
}

#[tokio::test]
async fn placed_order_ignores_later_catalog_and_address_changes() {
    let catalog = common::catalog();
    let shop = Storefront::new(
        Arc::new(folio_store::MemoryStore::new()),
        catalog.clone(),
        Arc::new(ScriptedGateway::approving()),
        CommerceConfig::default(),
    );
    let owner = OwnerId::new("u1");
    let home = shop.addresses.add(&owner, address("Home")).await.unwrap();
    shop.carts
        .add_item(&owner, &BookId::new("book1"), 1)
        .await
        .unwrap();

    let order = shop
        .checkout
        .place_order(&owner, Some(&home.id), PaymentMethod::Card)
        .await
        .unwrap();

    catalog
        .upsert(BookSnapshot::new("book1", "Dune", "Frank Herbert", Money::from_major(10)))
        .await;
    let patch = AddressPatch {
        city: Some("Chennai".into()),
        ..Default::default()
    };
    shop.addresses.update(&owner, &home.id, patch).await.unwrap();

    let stored = shop.orders.get_order(&owner, &order.id).await.unwrap();
    assert_eq!(stored.items[0].price, Money::from_major(399));
    assert_eq!(stored.shipping_address.city, "Bengaluru");
}
