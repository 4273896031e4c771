mod common;

use std::sync::Arc;

use common::storefront;
use folio_commerce::prelude::*;

fn session(shop: &Storefront) -> ClientSession {
    ClientSession::new(Arc::new(shop.clone()))
}

#[tokio::test]
async fn server_cart_wins_for_shared_books() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");
    shop.carts
        .add_item(&owner, &BookId::new("book1"), 3)
        .await
        .unwrap();

    let mut session = session(&shop);
    session.add_to_cart(&BookId::new("book1"), 1).await.unwrap();

    let report = session.login(owner.clone()).await.unwrap();
    assert!(report.pushed.is_empty());
    assert_eq!(report.overlapping, vec![BookId::new("book1")]);
    assert_eq!(session.state().cart, vec![CartLine::new("book1", 3)]);
    assert_eq!(
        shop.carts.get(&owner).await.unwrap().lines,
        vec![CartLine::new("book1", 3)]
    );
}

#[tokio::test]
async fn anonymous_contributions_are_pushed_exactly_once() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");
    let dune = shop.book(&BookId::new("book1")).await.unwrap();

    let mut session = session(&shop);
    session.add_to_cart(&BookId::new("book2"), 2).await.unwrap();
    session.add_to_wishlist(dune).await.unwrap();

    let report = session.login(owner.clone()).await.unwrap();
    assert_eq!(report.pushed.len(), 2);
    assert!(report.is_clean());
    assert_eq!(session.state().cart_quantity(&BookId::new("book2")), 2);
    assert!(session.state().in_wishlist(&BookId::new("book1")));

    // Logging out and back in must not push the same lines again.
    session.logout();
    assert!(session.state().is_empty());
    let report = session.login(owner.clone()).await.unwrap();
    assert!(report.pushed.is_empty());
    assert_eq!(shop.carts.get(&owner).await.unwrap().item_count(), 2);
}

#[tokio::test]
async fn refused_push_does_not_abort_login() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");

    let mut session = session(&shop);
    let ghost = BookSnapshot::new("ghost", "Gone", "Nobody", Money::from_major(1));
    session.add_to_wishlist(ghost).await.unwrap();
    session.add_to_cart(&BookId::new("book3"), 1).await.unwrap();

    let report = session.login(owner.clone()).await.unwrap();
    assert_eq!(report.pushed.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].op.book_id(), &BookId::new("ghost"));
    assert!(session.is_authenticated());
    assert!(session.state().wishlist.is_empty());
}

#[tokio::test]
async fn authenticated_mirror_tracks_server_responses() {
    let shop = storefront(Arc::new(ScriptedGateway::approving()));
    let owner = OwnerId::new("u1");

    let mut session = session(&shop);
    session.login(owner.clone()).await.unwrap();

    session.add_to_cart(&BookId::new("book1"), 2).await.unwrap();
    assert!(session.set_cart_quantity(&BookId::new("book9"), 1).await.is_err());
    assert_eq!(session.state().cart, vec![CartLine::new("book1", 2)]);

    shop.wishlists.add(&owner, &BookId::new("book2")).await.unwrap();
    session.move_to_cart(&BookId::new("book2")).await.unwrap();
    assert_eq!(session.state().cart_quantity(&BookId::new("book2")), 1);
    assert_eq!(
        session.state(),
        &shop.fetch_state(&owner).await.unwrap()
    );
}

#[tokio::test]
async fn merge_is_pure() {
    let local = SessionState {
        cart: vec![CartLine::new("book1", 1), CartLine::new("book2", 2)],
        ..Default::default()
    };
    let server = SessionState {
        cart: vec![CartLine::new("book1", 3)],
        ..Default::default()
    };

    let first = merge(&local, &server);
    let second = merge(&local, &server);
    assert_eq!(first, second);
    assert_eq!(
        first.push,
        vec![PushOp::AddToCart {
            book_id: BookId::new("book2"),
            quantity: 2
        }]
    );
    assert_eq!(first.final_state.cart_quantity(&BookId::new("book1")), 3);
}
