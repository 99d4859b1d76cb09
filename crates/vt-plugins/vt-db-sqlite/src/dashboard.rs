use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use vt_core::{ChannelStats, ChannelVideo, DashboardRepo};

use crate::SqliteStore;

#[derive(FromRow)]
struct StatsRow {
    total_videos: i64,
    total_views: i64,
    total_likes: i64,
    total_subscribers: i64,
}

#[derive(FromRow)]
struct ChannelVideoRow {
    id: Uuid,
    title: String,
    thumbnail: String,
    views: i64,
    is_published: bool,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl DashboardRepo for SqliteStore {
    /// A bare aggregate always yields exactly one row, so a channel without
    /// videos still reports its subscriber count.
    async fn channel_stats(&self, channel: Uuid) -> anyhow::Result<ChannelStats> {
        let row: StatsRow = sqlx::query_as(
            "WITH per_video AS ( \
                 SELECT v.views, \
                        (SELECT COUNT(*) FROM likes AS l \
                          WHERE l.target_kind = 'video' AND l.target_id = v.id) AS likes \
                 FROM videos AS v WHERE v.owner = ?1 \
             ) \
             SELECT COUNT(*) AS total_videos, \
                    COALESCE(SUM(views), 0) AS total_views, \
                    COALESCE(SUM(likes), 0) AS total_likes, \
                    (SELECT COUNT(*) FROM subscriptions WHERE channel = ?1) AS total_subscribers \
             FROM per_video",
        )
        .bind(channel)
        .fetch_one(&self.pool)
        .await?;

        Ok(ChannelStats {
            total_videos: row.total_videos,
            total_views: row.total_views,
            total_likes: row.total_likes,
            total_subscribers: row.total_subscribers,
        })
    }

    async fn channel_videos(&self, channel: Uuid) -> anyhow::Result<Vec<ChannelVideo>> {
        let rows: Vec<ChannelVideoRow> = sqlx::query_as(
            "SELECT id, title, thumbnail, views, is_published, created_at FROM videos \
             WHERE owner = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(channel)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ChannelVideo {
                id: r.id,
                title: r.title,
                thumbnail: r.thumbnail,
                views: r.views,
                is_published: r.is_published,
                created_at: r.created_at,
            })
            .collect())
    }
}
