//! Client session state machine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cart::{add_line, remove_line, set_line_quantity};
use crate::catalog::BookSnapshot;
use crate::error::CommerceError;
use crate::ids::{BookId, OwnerId};
use crate::sync::{merge, PushOp, RemoteCommerce, SessionState};
use crate::wishlist::WishlistLine;

/// Where a session is.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    /// Mutations touch only the local cache.
    Anonymous { cache: SessionState },
    /// Mutations go to the server; `mirror` holds its last confirmed answer.
    Authenticated {
        owner_id: OwnerId,
        mirror: SessionState,
    },
}

/// A push the server refused during login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPush {
    pub op: PushOp,
    pub error: String,
}

/// What happened during a login merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Pushes the server accepted.
    pub pushed: Vec<PushOp>,
    /// Pushes the server refused. Login still succeeds.
    pub failed: Vec<FailedPush>,
    /// Books where the server copy replaced the local one.
    pub overlapping: Vec<BookId>,
}

impl SyncReport {
    /// Check if every push went through.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One shopper's client-side view of their cart and wishlist.
///
/// The current owner is held here and passed explicitly to every server
/// call; nothing is read from ambient state.
pub struct ClientSession {
    remote: Arc<dyn RemoteCommerce>,
    phase: SessionPhase,
}

impl ClientSession {
    /// Start an anonymous session with an empty cache.
    pub fn new(remote: Arc<dyn RemoteCommerce>) -> Self {
        Self::with_cache(remote, SessionState::default())
    }

    /// Start an anonymous session from a previously stored cache.
    pub fn with_cache(remote: Arc<dyn RemoteCommerce>, cache: SessionState) -> Self {
        Self {
            remote,
            phase: SessionPhase::Anonymous { cache },
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// The cache or mirror, whichever is current.
    pub fn state(&self) -> &SessionState {
        match &self.phase {
            SessionPhase::Anonymous { cache } => cache,
            SessionPhase::Authenticated { mirror, .. } => mirror,
        }
    }

    /// Signed-in owner, if any.
    pub fn owner_id(&self) -> Option<&OwnerId> {
        match &self.phase {
            SessionPhase::Anonymous { .. } => None,
            SessionPhase::Authenticated { owner_id, .. } => Some(owner_id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.owner_id().is_some()
    }

    /// Sign in and reconcile the anonymous cache with the server.
    ///
    /// Cache-only lines are pushed once; a refused push is reported and does
    /// not abort the login. The mirror is then loaded from the server and the
    /// anonymous cache is emptied. If the server cannot be read the session
    /// stays anonymous with its cache untouched.
    #[tracing::instrument(skip(self), fields(owner = %owner_id))]
    pub async fn login(&mut self, owner_id: OwnerId) -> Result<SyncReport, CommerceError> {
        let cache = match &self.phase {
            SessionPhase::Anonymous { cache } => cache.clone(),
            SessionPhase::Authenticated { owner_id: current, .. } => {
                return Err(CommerceError::InvalidInput(format!(
                    "session is already signed in as {current}"
                )));
            }
        };

        let server = self.remote.fetch_state(&owner_id).await?;
        let plan = merge(&cache, &server);

        let mut report = SyncReport {
            overlapping: plan.overlapping,
            ..Default::default()
        };
        for op in plan.push {
            match self.push(&owner_id, &op).await {
                Ok(()) => report.pushed.push(op),
                Err(e) => {
                    tracing::warn!(book = %op.book_id(), error = %e, "merge push refused");
                    report.failed.push(FailedPush {
                        op,
                        error: e.to_string(),
                    });
                }
            }
        }

        let mirror = self.remote.fetch_state(&owner_id).await?;
        tracing::info!(
            pushed = report.pushed.len(),
            failed = report.failed.len(),
            overlapping = report.overlapping.len(),
            "session merged"
        );
        self.phase = SessionPhase::Authenticated { owner_id, mirror };
        Ok(report)
    }

    /// Sign out. The server record is untouched and a fresh, empty anonymous
    /// cache begins.
    pub fn logout(&mut self) {
        if let SessionPhase::Authenticated { owner_id, .. } = &self.phase {
            tracing::debug!(owner = %owner_id, "signed out");
        }
        self.phase = SessionPhase::Anonymous {
            cache: SessionState::default(),
        };
    }

    /// Reload the mirror from the server.
    pub async fn refresh(&mut self) -> Result<&SessionState, CommerceError> {
        if let SessionPhase::Authenticated { owner_id, mirror } = &mut self.phase {
            *mirror = self.remote.fetch_state(owner_id).await?;
        }
        Ok(self.state())
    }

    /// Add copies of a book to the cart.
    pub async fn add_to_cart(
        &mut self,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<&SessionState, CommerceError> {
        match &mut self.phase {
            SessionPhase::Anonymous { cache } => {
                add_line(&mut cache.cart, book_id, quantity)?;
            }
            SessionPhase::Authenticated { owner_id, mirror } => {
                let cart = self.remote.add_to_cart(owner_id, book_id, quantity).await?;
                mirror.cart = cart.lines;
            }
        }
        Ok(self.state())
    }

    /// Set a cart line's quantity.
    pub async fn set_cart_quantity(
        &mut self,
        book_id: &BookId,
        quantity: i64,
    ) -> Result<&SessionState, CommerceError> {
        match &mut self.phase {
            SessionPhase::Anonymous { cache } => {
                set_line_quantity(&mut cache.cart, book_id, quantity)?;
            }
            SessionPhase::Authenticated { owner_id, mirror } => {
                let cart = self
                    .remote
                    .set_cart_quantity(owner_id, book_id, quantity)
                    .await?;
                mirror.cart = cart.lines;
            }
        }
        Ok(self.state())
    }

    /// Remove a cart line.
    pub async fn remove_from_cart(
        &mut self,
        book_id: &BookId,
    ) -> Result<&SessionState, CommerceError> {
        match &mut self.phase {
            SessionPhase::Anonymous { cache } => {
                remove_line(&mut cache.cart, book_id);
            }
            SessionPhase::Authenticated { owner_id, mirror } => {
                let cart = self.remote.remove_from_cart(owner_id, book_id).await?;
                mirror.cart = cart.lines;
            }
        }
        Ok(self.state())
    }

    /// Empty the cart.
    pub async fn clear_cart(&mut self) -> Result<&SessionState, CommerceError> {
        match &mut self.phase {
            SessionPhase::Anonymous { cache } => cache.cart.clear(),
            SessionPhase::Authenticated { owner_id, mirror } => {
                let cart = self.remote.clear_cart(owner_id).await?;
                mirror.cart = cart.lines;
            }
        }
        Ok(self.state())
    }

    /// Save a book.
    ///
    /// An anonymous session stores the snapshot it is given; a signed-in
    /// session lets the server take its own.
    pub async fn add_to_wishlist(
        &mut self,
        book: BookSnapshot,
    ) -> Result<&SessionState, CommerceError> {
        match &mut self.phase {
            SessionPhase::Anonymous { cache } => {
                if cache.in_wishlist(&book.book_id) {
                    return Err(CommerceError::Conflict(format!(
                        "book {} is already in the wishlist",
                        book.book_id
                    )));
                }
                cache.wishlist.push(WishlistLine::snapshot(book));
            }
            SessionPhase::Authenticated { owner_id, mirror } => {
                let wishlist = self.remote.add_to_wishlist(owner_id, &book.book_id).await?;
                mirror.wishlist = wishlist.lines;
            }
        }
        Ok(self.state())
    }

    /// Remove a saved book.
    pub async fn remove_from_wishlist(
        &mut self,
        book_id: &BookId,
    ) -> Result<&SessionState, CommerceError> {
        match &mut self.phase {
            SessionPhase::Anonymous { cache } => {
                cache.wishlist.retain(|l| &l.book_id != book_id);
            }
            SessionPhase::Authenticated { owner_id, mirror } => {
                let wishlist = self.remote.remove_from_wishlist(owner_id, book_id).await?;
                mirror.wishlist = wishlist.lines;
            }
        }
        Ok(self.state())
    }

    /// Move a saved book into the cart with quantity 1.
    pub async fn move_to_cart(&mut self, book_id: &BookId) -> Result<&SessionState, CommerceError> {
        match &mut self.phase {
            SessionPhase::Anonymous { cache } => {
                if !cache.in_wishlist(book_id) {
                    return Err(CommerceError::NotFound(format!(
                        "book {book_id} is not in the wishlist"
                    )));
                }
                add_line(&mut cache.cart, book_id, 1)?;
                cache.wishlist.retain(|l| &l.book_id != book_id);
            }
            SessionPhase::Authenticated { owner_id, mirror } => {
                let (wishlist, cart) = self.remote.move_to_cart(owner_id, book_id).await?;
                mirror.wishlist = wishlist.lines;
                mirror.cart = cart.lines;
            }
        }
        Ok(self.state())
    }

    async fn push(&self, owner_id: &OwnerId, op: &PushOp) -> Result<(), CommerceError> {
        match op {
            PushOp::AddToCart { book_id, quantity } => {
                self.remote.add_to_cart(owner_id, book_id, *quantity).await?;
            }
            PushOp::AddToWishlist { book_id } => {
                match self.remote.add_to_wishlist(owner_id, book_id).await {
                    // Saved from another device since the server was read.
                    Ok(_) | Err(CommerceError::Conflict(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::cart::{Cart, CartLine};
    use crate::money::Money;
    use crate::wishlist::Wishlist;

    /// Server double backed by a single in-memory state.
    #[derive(Default)]
    struct FakeRemote {
        state: Mutex<SessionState>,
        offline: Mutex<bool>,
    }

    impl FakeRemote {
        fn with_state(state: SessionState) -> Self {
            Self {
                state: Mutex::new(state),
                offline: Mutex::new(false),
            }
        }

        fn set_offline(&self, offline: bool) {
            *self.offline.lock().unwrap() = offline;
        }

        fn check(&self) -> Result<(), CommerceError> {
            if *self.offline.lock().unwrap() {
                Err(CommerceError::UpstreamUnavailable("offline".into()))
            } else {
                Ok(())
            }
        }

        fn cart(&self, owner_id: &OwnerId) -> Cart {
            let mut cart = Cart::new(owner_id.clone());
            cart.lines = self.state.lock().unwrap().cart.clone();
            cart
        }

        fn wishlist(&self, owner_id: &OwnerId) -> Wishlist {
            let mut wishlist = Wishlist::new(owner_id.clone());
            wishlist.lines = self.state.lock().unwrap().wishlist.clone();
            wishlist
        }
    }

    #[async_trait]
    impl RemoteCommerce for FakeRemote {
        async fn fetch_state(&self, _owner_id: &OwnerId) -> Result<SessionState, CommerceError> {
            self.check()?;
            Ok(self.state.lock().unwrap().clone())
        }

        async fn add_to_cart(
            &self,
            owner_id: &OwnerId,
            book_id: &BookId,
            quantity: i64,
        ) -> Result<Cart, CommerceError> {
            self.check()?;
            add_line(&mut self.state.lock().unwrap().cart, book_id, quantity)?;
            Ok(self.cart(owner_id))
        }

        async fn set_cart_quantity(
            &self,
            owner_id: &OwnerId,
            book_id: &BookId,
            quantity: i64,
        ) -> Result<Cart, CommerceError> {
            self.check()?;
            set_line_quantity(&mut self.state.lock().unwrap().cart, book_id, quantity)?;
            Ok(self.cart(owner_id))
        }

        async fn remove_from_cart(
            &self,
            owner_id: &OwnerId,
            book_id: &BookId,
        ) -> Result<Cart, CommerceError> {
            self.check()?;
            remove_line(&mut self.state.lock().unwrap().cart, book_id);
            Ok(self.cart(owner_id))
        }

        async fn clear_cart(&self, owner_id: &OwnerId) -> Result<Cart, CommerceError> {
            self.check()?;
            self.state.lock().unwrap().cart.clear();
            Ok(self.cart(owner_id))
        }

        async fn add_to_wishlist(
            &self,
            owner_id: &OwnerId,
            book_id: &BookId,
        ) -> Result<Wishlist, CommerceError> {
            self.check()?;
            self.state.lock().unwrap().wishlist.push(WishlistLine::snapshot(
                BookSnapshot::new(book_id.clone(), "T", "A", Money::from_major(1)),
            ));
            Ok(self.wishlist(owner_id))
        }

        async fn remove_from_wishlist(
            &self,
            owner_id: &OwnerId,
            book_id: &BookId,
        ) -> Result<Wishlist, CommerceError> {
            self.check()?;
            self.state
                .lock()
                .unwrap()
                .wishlist
                .retain(|l| &l.book_id != book_id);
            Ok(self.wishlist(owner_id))
        }

        async fn move_to_cart(
            &self,
            owner_id: &OwnerId,
            book_id: &BookId,
        ) -> Result<(Wishlist, Cart), CommerceError> {
            self.check()?;
            {
                let mut state = self.state.lock().unwrap();
                add_line(&mut state.cart, book_id, 1)?;
                state.wishlist.retain(|l| &l.book_id != book_id);
            }
            Ok((self.wishlist(owner_id), self.cart(owner_id)))
        }
    }

    fn server_with_cart(lines: Vec<CartLine>) -> Arc<FakeRemote> {
        Arc::new(FakeRemote::with_state(SessionState {
            cart: lines,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_anonymous_mutations_stay_local() {
        let remote = server_with_cart(vec![]);
        remote.set_offline(true);
        let mut session = ClientSession::new(remote);

        session.add_to_cart(&BookId::new("b1"), 2).await.unwrap();
        session.set_cart_quantity(&BookId::new("b1"), 5).await.unwrap();
        assert_eq!(session.state().cart, vec![CartLine::new("b1", 5)]);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_server_wins() {
        let remote = server_with_cart(vec![CartLine::new("b1", 3)]);
        let mut session = ClientSession::new(remote);
        session.add_to_cart(&BookId::new("b1"), 1).await.unwrap();

        let report = session.login(OwnerId::new("u1")).await.unwrap();
        assert!(report.pushed.is_empty());
        assert_eq!(report.overlapping, vec![BookId::new("b1")]);
        assert_eq!(session.state().cart, vec![CartLine::new("b1", 3)]);
    }

    #[tokio::test]
    async fn test_login_pushes_local_only_lines_once() {
        let remote = server_with_cart(vec![]);
        let mut session = ClientSession::new(remote.clone());
        session.add_to_cart(&BookId::new("b1"), 2).await.unwrap();

        let report = session.login(OwnerId::new("u1")).await.unwrap();
        assert_eq!(report.pushed.len(), 1);
        assert_eq!(session.state().cart, vec![CartLine::new("b1", 2)]);

        session.logout();
        assert!(session.state().is_empty());

        session.login(OwnerId::new("u1")).await.unwrap();
        assert_eq!(session.state().cart_quantity(&BookId::new("b1")), 2);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_cache() {
        let remote = server_with_cart(vec![]);
        let mut session = ClientSession::new(remote.clone());
        session.add_to_cart(&BookId::new("b1"), 1).await.unwrap();

        remote.set_offline(true);
        assert!(session.login(OwnerId::new("u1")).await.is_err());
        assert!(!session.is_authenticated());
        assert_eq!(session.state().cart, vec![CartLine::new("b1", 1)]);
    }

    #[tokio::test]
    async fn test_mirror_only_changes_on_success() {
        let remote = server_with_cart(vec![CartLine::new("b1", 1)]);
        let mut session = ClientSession::new(remote.clone());
        session.login(OwnerId::new("u1")).await.unwrap();

        remote.set_offline(true);
        assert!(session.add_to_cart(&BookId::new("b2"), 1).await.is_err());
        assert_eq!(session.state().cart, vec![CartLine::new("b1", 1)]);

        remote.set_offline(false);
        session.add_to_cart(&BookId::new("b2"), 1).await.unwrap();
        assert_eq!(session.state().cart.len(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_move_to_cart() {
        let mut session = ClientSession::new(server_with_cart(vec![]));
        let book = BookSnapshot::new("b1", "Dune", "Frank Herbert", Money::from_major(399));
        session.add_to_wishlist(book.clone()).await.unwrap();
        assert!(matches!(
            session.add_to_wishlist(book).await,
            Err(CommerceError::Conflict(_))
        ));

        session.move_to_cart(&BookId::new("b1")).await.unwrap();
        assert!(session.state().wishlist.is_empty());
        assert_eq!(session.state().cart, vec![CartLine::new("b1", 1)]);
    }
}
