use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use vt_core::pagination::{Page, PageRequest};
use vt_core::{Tweet, TweetRepo, TweetView};

use crate::{into_page, ts, user_summary, FacetRow, SqliteStore};

#[derive(FromRow)]
struct TweetRow {
    id: Uuid,
    content: String,
    owner: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct TweetViewRow {
    total: i64,
    id: Option<Uuid>,
    content: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    owner_id: Option<Uuid>,
    username: Option<String>,
    avatar: Option<String>,
}

impl FacetRow for TweetViewRow {
    type Item = TweetView;

    fn total(&self) -> i64 {
        self.total
    }

    fn into_item(self) -> Option<TweetView> {
        Some(TweetView {
            id: self.id?,
            content: self.content?,
            created_at: self.created_at?,
            updated_at: self.updated_at?,
            owner: user_summary(self.owner_id, self.username, self.avatar),
        })
    }
}

#[async_trait]
impl TweetRepo for SqliteStore {
    async fn insert_tweet(&self, tweet: Tweet) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO tweets (id, content, owner, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(tweet.id)
        .bind(tweet.content)
        .bind(tweet.owner)
        .bind(ts(tweet.created_at))
        .bind(ts(tweet.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn tweets_by_owner(
        &self,
        owner: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<Page<TweetView>> {
        let rows: Vec<TweetViewRow> = sqlx::query_as(
            "WITH filtered AS ( \
                 SELECT id, content, owner, created_at, updated_at FROM tweets WHERE owner = ?1 \
             ), \
             slice AS ( \
                 SELECT * FROM filtered ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3 \
             ) \
             SELECT t.total, s.id, s.content, s.created_at, s.updated_at, \
                    u.id AS owner_id, u.username, u.avatar \
             FROM (SELECT COUNT(*) AS total FROM filtered) AS t \
             LEFT JOIN slice AS s ON 1 = 1 \
             LEFT JOIN users AS u ON u.id = s.owner \
             ORDER BY s.created_at DESC, s.id DESC",
        )
        .bind(owner)
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(into_page(rows, page))
    }

    async fn update_tweet(
        &self,
        id: Uuid,
        owner: Uuid,
        content: String,
    ) -> anyhow::Result<Option<Tweet>> {
        let row: Option<TweetRow> = sqlx::query_as(
            "UPDATE tweets SET content = ?, updated_at = ? WHERE id = ? AND owner = ? \
             RETURNING id, content, owner, created_at, updated_at",
        )
        .bind(content)
        .bind(ts(Utc::now()))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| Tweet {
            id: r.id,
            content: r.content,
            owner: r.owner,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }))
    }

    async fn delete_tweet(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
