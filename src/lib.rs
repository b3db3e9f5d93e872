//! Swipe-to-vote topic feed engine.
//!
//! Users swipe through a stream of short topics, casting overrated /
//! underrated / skip votes, and see the community's aggregate sentiment after
//! each one. This crate covers the feed itself: gesture classification
//! ([`gesture`]), shuffle-and-demote ordering ([`feed`]), the per-card vote
//! state machine ([`session::vote`]), and the session controller that owns
//! the queue and the down-rank set ([`session`]). Votes and comments persist
//! through the [`store::VoteStore`] trait; [`store::SqliteStore`] is the
//! bundled implementation.

pub mod audio;
pub mod feed;
pub mod gesture;
pub mod models;
pub mod prefs;
pub mod session;
pub mod store;

pub use models::{Comment, DragSample, SwipeDirection, Topic, VoteResult, VoteType};
pub use session::{FeedPhase, SessionController, SwipeOutcome};
pub use store::{SqliteStore, StoreError, VoteStore};
