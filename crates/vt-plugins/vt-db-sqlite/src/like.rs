use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;
use vt_core::{Like, LikeKind, LikeRepo, LikedVideo};

use crate::{ts, user_summary, SqliteStore};

#[derive(FromRow)]
struct LikedVideoRow {
    id: Uuid,
    title: String,
    thumbnail: String,
    duration: f64,
    views: i64,
    owner_id: Option<Uuid>,
    username: Option<String>,
    avatar: Option<String>,
}

#[async_trait]
impl LikeRepo for SqliteStore {
    /// Delete-or-insert inside one transaction. The unique index on
    /// `(target_kind, target_id, liked_by)` turns a racing duplicate insert
    /// into a no-op.
    async fn toggle_like(&self, like: Like) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let kind = like.target.kind.as_str();

        let removed = sqlx::query(
            "DELETE FROM likes WHERE target_kind = ? AND target_id = ? AND liked_by = ?",
        )
        .bind(kind)
        .bind(like.target.target_id)
        .bind(like.liked_by)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO likes (id, target_kind, target_id, liked_by, created_at) VALUES (?, ?, ?, ?, ?) \
                 ON CONFLICT (target_kind, target_id, liked_by) DO NOTHING",
            )
            .bind(like.id)
            .bind(kind)
            .bind(like.target.target_id)
            .bind(like.liked_by)
            .bind(ts(like.created_at))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(removed == 0)
    }

    async fn liked_videos(&self, user: Uuid) -> anyhow::Result<Vec<LikedVideo>> {
        let rows: Vec<LikedVideoRow> = sqlx::query_as(
            "SELECT v.id, v.title, v.thumbnail, v.duration, v.views, \
                    u.id AS owner_id, u.username, u.avatar \
             FROM likes AS l \
             JOIN videos AS v ON v.id = l.target_id \
             LEFT JOIN users AS u ON u.id = v.owner \
             WHERE l.liked_by = ? AND l.target_kind = ? \
             ORDER BY l.created_at DESC, l.id DESC",
        )
        .bind(user)
        .bind(LikeKind::Video.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LikedVideo {
                id: r.id,
                title: r.title,
                thumbnail: r.thumbnail,
                duration: r.duration,
                views: r.views,
                owner: user_summary(r.owner_id, r.username, r.avatar),
            })
            .collect())
    }
}
