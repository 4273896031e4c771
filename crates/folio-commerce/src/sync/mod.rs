//! Client cache and server store reconciliation.
//!
//! A shopper browses anonymously against a local cache. Signing in runs a
//! one-shot [`merge`]: lines only the cache knows about are pushed to the
//! server once, lines both sides know about keep the server's copy, and from
//! then on the cache is only a mirror of confirmed server responses.

mod merge;
mod remote;
mod session;
mod state;

pub use merge::{merge, MergePlan, PushOp};
pub use remote::RemoteCommerce;
pub use session::{ClientSession, FailedPush, SessionPhase, SyncReport};
pub use state::SessionState;
