use chrono::{DateTime, Utc};
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
    Row, Sqlite,
};
use std::env;

use async_trait::async_trait;

use crate::models::{Comment, Topic, VoteResult, VoteType};
use crate::store::{Leaderboard, RankedTopic, StoreError, VoteStore, COMMENT_PAGE_SIZE};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect using `DATABASE_URL`, defaulting to a local file.
    pub async fn from_env() -> Result<Self, StoreError> {
        let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:over_under.db".to_string());
        Self::connect(&db_url).await
    }

    pub async fn connect(db_url: &str) -> Result<Self, StoreError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }

        // One connection is enough: sessions are single-threaded and votes
        // never run in parallel.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    // Initialize the database schema
    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS topics (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                emoji TEXT NOT NULL,
                category TEXT NOT NULL,
                vote_over INTEGER NOT NULL DEFAULT 0,
                vote_under INTEGER NOT NULL DEFAULT 0,
                vote_ignore INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                topic_id TEXT NOT NULL,
                text TEXT NOT NULL,
                upvotes INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (topic_id) REFERENCES topics(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    fn topic_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Topic, StoreError> {
        let created_at_str = row.get::<String, _>("created_at");
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| StoreError::Remote(format!("failed to parse created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Topic {
            id: row.get::<String, _>("id"),
            text: row.get::<String, _>("text"),
            emoji: row.get::<String, _>("emoji"),
            category: row.get::<String, _>("category"),
            vote_over: row.get::<i64, _>("vote_over"),
            vote_under: row.get::<i64, _>("vote_under"),
            vote_ignore: row.get::<i64, _>("vote_ignore"),
            created_at,
        })
    }

    fn comment_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Comment, StoreError> {
        let created_at_str = row.get::<String, _>("created_at");
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| StoreError::Remote(format!("failed to parse created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Comment {
            id: row.get::<String, _>("id"),
            topic_id: row.get::<String, _>("topic_id"),
            text: row.get::<String, _>("text"),
            upvotes: row.get::<i64, _>("upvotes"),
            created_at,
        })
    }
}

#[async_trait]
impl VoteStore for SqliteStore {
    async fn fetch_topics(&self) -> Result<Vec<Topic>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, text, emoji, category, vote_over, vote_under, vote_ignore, created_at
            FROM topics
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::topic_from_row).collect()
    }

    async fn record_vote(
        &self,
        topic_id: &str,
        vote_type: VoteType,
    ) -> Result<VoteResult, StoreError> {
        // Single statement so the increment and the aggregate read are one
        // round trip.
        let sql = match vote_type {
            VoteType::Over => {
                r#"
                UPDATE topics SET vote_over = vote_over + 1
                WHERE id = ?
                RETURNING vote_over, vote_under
                "#
            }
            VoteType::Under => {
                r#"
                UPDATE topics SET vote_under = vote_under + 1
                WHERE id = ?
                RETURNING vote_over, vote_under
                "#
            }
            VoteType::Ignore => {
                r#"
                UPDATE topics SET vote_ignore = vote_ignore + 1
                WHERE id = ?
                RETURNING vote_over, vote_under
                "#
            }
        };

        let row = sqlx::query(sql)
            .bind(topic_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::TopicNotFound(topic_id.to_string()))?;

        Ok(VoteResult::from_counts(
            row.get::<i64, _>("vote_over"),
            row.get::<i64, _>("vote_under"),
        ))
    }

    async fn fetch_comments(&self, topic_id: &str) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, topic_id, text, upvotes, created_at
            FROM comments
            WHERE topic_id = ?
            ORDER BY upvotes DESC
            LIMIT ?
            "#,
        )
        .bind(topic_id)
        .bind(COMMENT_PAGE_SIZE)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::comment_from_row).collect()
    }

    async fn post_comment(&self, topic_id: &str, text: &str) -> Result<Comment, StoreError> {
        let topic_exists = sqlx::query("SELECT 1 FROM topics WHERE id = ?")
            .bind(topic_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();

        if !topic_exists {
            return Err(StoreError::TopicNotFound(topic_id.to_string()));
        }

        let comment = Comment::new(topic_id, text);
        sqlx::query(
            r#"
            INSERT INTO comments (id, topic_id, text, upvotes, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.topic_id)
        .bind(&comment.text)
        .bind(comment.upvotes)
        .bind(comment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn upvote_comment(&self, comment_id: &str) -> Result<i64, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE comments SET upvotes = upvotes + 1
            WHERE id = ?
            RETURNING upvotes
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::CommentNotFound(comment_id.to_string()))?;

        Ok(row.get::<i64, _>("upvotes"))
    }

    async fn insert_topic(&self, topic: &Topic) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO topics (id, text, emoji, category, vote_over, vote_under, vote_ignore, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&topic.id)
        .bind(&topic.text)
        .bind(&topic.emoji)
        .bind(&topic.category)
        .bind(topic.vote_over)
        .bind(topic.vote_under)
        .bind(topic.vote_ignore)
        .bind(topic.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn leaderboard(&self) -> Result<Leaderboard, StoreError> {
        let topics = self.fetch_topics().await?;

        let mut ranked: Vec<RankedTopic> = topics
            .into_iter()
            .filter(|t| t.vote_over + t.vote_under > 0)
            .map(|t| {
                let percent = VoteResult::from_counts(t.vote_over, t.vote_under).overrated_percent;
                RankedTopic {
                    topic: t,
                    overrated_percent: percent,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.overrated_percent.cmp(&a.overrated_percent));
        let most_overrated: Vec<RankedTopic> = ranked.iter().take(10).cloned().collect();

        ranked.sort_by(|a, b| a.overrated_percent.cmp(&b.overrated_percent));
        let most_underrated: Vec<RankedTopic> = ranked.into_iter().take(10).collect();

        Ok(Leaderboard {
            most_overrated,
            most_underrated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store")
    }

    fn topic_with_counts(text: &str, category: &str, over: i64, under: i64) -> Topic {
        let mut t = Topic::new(text, "x", category);
        t.vote_over = over;
        t.vote_under = under;
        t
    }

    #[tokio::test]
    async fn record_vote_increments_and_returns_aggregates() {
        let store = memory_store().await;
        let topic = topic_with_counts("pineapple pizza", "Food", 3, 7);
        store.insert_topic(&topic).await.unwrap();

        let result = store.record_vote(&topic.id, VoteType::Over).await.unwrap();
        assert_eq!(result.overrated_percent, 40);
        assert_eq!(result.underrated_percent, 60);
        assert_eq!(result.total_votes, 10);
    }

    #[tokio::test]
    async fn ignore_votes_do_not_move_the_percentages() {
        let store = memory_store().await;
        let topic = topic_with_counts("reality tv", "TV", 2, 2);
        store.insert_topic(&topic).await.unwrap();

        let result = store.record_vote(&topic.id, VoteType::Ignore).await.unwrap();
        assert_eq!(result.overrated_percent, 50);
        assert_eq!(result.total_votes, 4);

        let topics = store.fetch_topics().await.unwrap();
        assert_eq!(topics[0].vote_ignore, 1);
    }

    #[tokio::test]
    async fn voting_on_a_missing_topic_is_an_error() {
        let store = memory_store().await;
        let err = store.record_vote("nope", VoteType::Over).await.unwrap_err();
        assert!(matches!(err, StoreError::TopicNotFound(_)));
    }

    #[tokio::test]
    async fn comments_come_back_most_upvoted_first() {
        let store = memory_store().await;
        let topic = Topic::new("oat milk", "x", "Food");
        store.insert_topic(&topic).await.unwrap();

        let first = store.post_comment(&topic.id, "so overpriced").await.unwrap();
        let second = store.post_comment(&topic.id, "actually great").await.unwrap();
        store.upvote_comment(&second.id).await.unwrap();
        let count = store.upvote_comment(&second.id).await.unwrap();
        assert_eq!(count, 2);

        let comments = store.fetch_comments(&topic.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, second.id);
        assert_eq!(comments[1].id, first.id);
    }

    #[tokio::test]
    async fn leaderboard_skips_unvoted_topics_and_sorts_both_ways() {
        let store = memory_store().await;
        store
            .insert_topic(&topic_with_counts("a", "Food", 9, 1))
            .await
            .unwrap();
        store
            .insert_topic(&topic_with_counts("b", "Food", 1, 9))
            .await
            .unwrap();
        store
            .insert_topic(&topic_with_counts("c", "Food", 0, 0))
            .await
            .unwrap();

        let board = store.leaderboard().await.unwrap();
        assert_eq!(board.most_overrated.len(), 2);
        assert_eq!(board.most_overrated[0].topic.text, "a");
        assert_eq!(board.most_underrated[0].topic.text, "b");
    }
}
