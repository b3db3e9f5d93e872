use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub text: String,
    pub emoji: String,
    pub category: String,
    pub vote_over: i64,
    pub vote_under: i64,
    pub vote_ignore: i64,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(
        text: impl Into<String>,
        emoji: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            emoji: emoji.into(),
            category: category.into(),
            vote_over: 0,
            vote_under: 0,
            vote_ignore: 0,
            created_at: Utc::now(),
        }
    }
}

/// A ternary vote. `Over` and `Under` feed the aggregate percentages;
/// `Ignore` is a skip: it is tallied for analytics only and down-ranks
/// the topic's category for future feed constructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteType {
    Over,
    Under,
    Ignore,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Over => "over",
            VoteType::Under => "under",
            VoteType::Ignore => "ignore",
        }
    }
}

/// Post-increment aggregate sentiment for one topic. Transient: created per
/// resolved vote and discarded once the user advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub overrated_percent: u8,
    pub underrated_percent: u8,
    pub total_votes: u64,
}

impl VoteResult {
    /// Neutral result, used when a vote submission fails or when a topic has
    /// no counted votes yet.
    pub const NEUTRAL: VoteResult = VoteResult {
        overrated_percent: 50,
        underrated_percent: 50,
        total_votes: 0,
    };

    /// Derive percentages from raw counts. Ignore votes are excluded from the
    /// denominator; the two percentages sum to 100 whenever any counted vote
    /// exists.
    pub fn from_counts(vote_over: i64, vote_under: i64) -> Self {
        let counted = vote_over + vote_under;
        if counted <= 0 {
            return VoteResult::NEUTRAL;
        }
        let over = ((vote_over as f64 / counted as f64) * 100.0).round() as u8;
        Self {
            overrated_percent: over,
            underrated_percent: 100 - over,
            total_votes: counted as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub topic_id: String,
    pub text: String,
    pub upvotes: i64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(topic_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            topic_id: topic_id.into(),
            text: text.into(),
            upvotes: 0,
            created_at: Utc::now(),
        }
    }
}

/// One pointer sample from a drag gesture, in logical pixels and
/// pixels-per-second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragSample {
    pub offset_x: f32,
    pub offset_y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
}

/// Terminal direction of a completed swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

impl SwipeDirection {
    pub fn vote_type(&self) -> VoteType {
        match self {
            SwipeDirection::Right => VoteType::Over,
            SwipeDirection::Left => VoteType::Under,
            SwipeDirection::Up => VoteType::Ignore,
        }
    }
}
