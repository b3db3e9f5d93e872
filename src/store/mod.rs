pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Comment, Topic, VoteResult, VoteType};

pub use self::sqlite::SqliteStore;

/// Comments returned per topic, descending by upvotes.
pub const COMMENT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("topic not found: {0}")]
    TopicNotFound(String),
    #[error("comment not found: {0}")]
    CommentNotFound(String),
    #[error("remote error: {0}")]
    Remote(String),
}

/// The external aggregator of votes and comments.
///
/// Filtering and down-ranking are client-side concerns; the store only does
/// bulk reads and atomic increments.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Bulk read of every voteable topic.
    async fn fetch_topics(&self) -> Result<Vec<Topic>, StoreError>;

    /// Atomically count one vote and return the post-increment aggregates.
    async fn record_vote(
        &self,
        topic_id: &str,
        vote_type: VoteType,
    ) -> Result<VoteResult, StoreError>;

    /// Comments for a topic, most upvoted first, capped at
    /// [`COMMENT_PAGE_SIZE`].
    async fn fetch_comments(&self, topic_id: &str) -> Result<Vec<Comment>, StoreError>;

    async fn post_comment(&self, topic_id: &str, text: &str) -> Result<Comment, StoreError>;

    /// Upvote a comment, returning its new upvote count.
    async fn upvote_comment(&self, comment_id: &str) -> Result<i64, StoreError>;

    async fn insert_topic(&self, topic: &Topic) -> Result<(), StoreError>;

    /// Top-10 most overrated and most underrated topics among those with at
    /// least one counted vote.
    async fn leaderboard(&self) -> Result<Leaderboard, StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    pub most_overrated: Vec<RankedTopic>,
    pub most_underrated: Vec<RankedTopic>,
}

#[derive(Debug, Clone)]
pub struct RankedTopic {
    pub topic: Topic,
    pub overrated_percent: u8,
}
