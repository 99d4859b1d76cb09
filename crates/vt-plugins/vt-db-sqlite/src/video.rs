use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use vt_core::pagination::{Page, SortOrder, VideoSortField};
use vt_core::{Video, VideoDetail, VideoQuery, VideoRepo, VideoSummary, VideoUpdate};

use crate::{into_page, like_pattern, ts, user_summary, FacetRow, SqliteStore};

#[derive(FromRow)]
pub(crate) struct VideoRow {
    id: Uuid,
    video_file: String,
    thumbnail: String,
    title: String,
    description: String,
    duration: f64,
    views: i64,
    is_published: bool,
    owner: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            video_file: row.video_file,
            thumbnail: row.thumbnail,
            title: row.title,
            description: row.description,
            duration: row.duration,
            views: row.views,
            is_published: row.is_published,
            owner: row.owner,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SummaryRow {
    total: i64,
    id: Option<Uuid>,
    title: Option<String>,
    thumbnail: Option<String>,
    duration: Option<f64>,
    views: Option<i64>,
    is_published: Option<bool>,
    created_at: Option<DateTime<Utc>>,
    owner_id: Option<Uuid>,
    username: Option<String>,
    avatar: Option<String>,
}

impl FacetRow for SummaryRow {
    type Item = VideoSummary;

    fn total(&self) -> i64 {
        self.total
    }

    fn into_item(self) -> Option<VideoSummary> {
        Some(VideoSummary {
            id: self.id?,
            title: self.title?,
            thumbnail: self.thumbnail?,
            duration: self.duration?,
            views: self.views?,
            is_published: self.is_published?,
            created_at: self.created_at?,
            owner: user_summary(self.owner_id, self.username, self.avatar),
        })
    }
}

fn sort_column(field: VideoSortField) -> &'static str {
    match field {
        VideoSortField::CreatedAt => "created_at",
        VideoSortField::Views => "views",
        VideoSortField::Title => "title",
    }
}

fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Search key for `title_folded`/`description_folded`. SQLite's own case
/// folding stops at ASCII.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

const VIDEO_COLUMNS: &str =
    "id, video_file, thumbnail, title, description, duration, views, is_published, owner, created_at, updated_at";

#[async_trait]
impl VideoRepo for SqliteStore {
    async fn insert_video(&self, video: Video) -> anyhow::Result<()> {
        let (title_folded, description_folded) = (fold(&video.title), fold(&video.description));
        sqlx::query(
            "INSERT INTO videos (id, video_file, thumbnail, title, description, title_folded, description_folded, \
                                 duration, views, is_published, owner, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(video.id)
        .bind(video.video_file)
        .bind(video.thumbnail)
        .bind(video.title)
        .bind(video.description)
        .bind(title_folded)
        .bind(description_folded)
        .bind(video.duration)
        .bind(video.views)
        .bind(video.is_published)
        .bind(video.owner)
        .bind(ts(video.created_at))
        .bind(ts(video.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Count and slice come from one statement over the same filtered set.
    async fn list_videos(&self, query: VideoQuery) -> anyhow::Result<Page<VideoSummary>> {
        // Only allow-listed identifiers are spliced into the SQL text.
        let col = sort_column(query.sort.field);
        let dir = sort_direction(query.sort.order);
        let sql = format!(
            "WITH filtered AS ( \
                 SELECT id, title, thumbnail, duration, views, is_published, owner, created_at \
                 FROM videos \
                 WHERE owner = ?1 \
                   AND (?2 OR is_published = 1) \
                   AND (?3 IS NULL OR title_folded LIKE ?3 ESCAPE '\\' OR description_folded LIKE ?3 ESCAPE '\\') \
             ), \
             slice AS ( \
                 SELECT * FROM filtered ORDER BY {col} {dir}, id {dir} LIMIT ?4 OFFSET ?5 \
             ) \
             SELECT t.total, s.id, s.title, s.thumbnail, s.duration, s.views, s.is_published, s.created_at, \
                    u.id AS owner_id, u.username, u.avatar \
             FROM (SELECT COUNT(*) AS total FROM filtered) AS t \
             LEFT JOIN slice AS s ON 1 = 1 \
             LEFT JOIN users AS u ON u.id = s.owner \
             ORDER BY s.{col} {dir}, s.id {dir}"
        );

        let rows: Vec<SummaryRow> = sqlx::query_as(&sql)
            .bind(query.owner)
            .bind(query.include_unpublished)
            .bind(query.search.as_deref().map(|needle| like_pattern(&fold(needle))))
            .bind(query.page.limit() as i64)
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(into_page(rows, query.page))
    }

    async fn view_video(&self, id: Uuid) -> anyhow::Result<Option<VideoDetail>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<VideoRow> = sqlx::query_as(&format!(
            "UPDATE videos SET views = views + 1 WHERE id = ? AND is_published = 1 RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(video) = row.map(Video::from) else {
            return Ok(None);
        };

        let owner: Option<(Uuid, String, String)> =
            sqlx::query_as("SELECT id, username, avatar FROM users WHERE id = ?")
                .bind(video.owner)
                .fetch_optional(&mut *tx)
                .await?;
        tx.commit().await?;

        Ok(Some(VideoDetail {
            id: video.id,
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            owner: owner.map(|(id, username, avatar)| vt_core::UserSummary { id, username, avatar }),
            created_at: video.created_at,
            updated_at: video.updated_at,
        }))
    }

    async fn find_owned_video(&self, id: Uuid, owner: Uuid) -> anyhow::Result<Option<Video>> {
        let row: Option<VideoRow> = sqlx::query_as(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ? AND owner = ?"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Video::from))
    }

    async fn update_video_details(
        &self,
        id: Uuid,
        owner: Uuid,
        update: VideoUpdate,
    ) -> anyhow::Result<Option<Video>> {
        let (title_folded, description_folded) = (fold(&update.title), fold(&update.description));
        let row: Option<VideoRow> = sqlx::query_as(&format!(
            "UPDATE videos SET title = ?, description = ?, title_folded = ?, description_folded = ?, \
                               thumbnail = ?, updated_at = ? \
             WHERE id = ? AND owner = ? RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(update.title)
        .bind(update.description)
        .bind(title_folded)
        .bind(description_folded)
        .bind(update.thumbnail)
        .bind(ts(Utc::now()))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Video::from))
    }

    async fn delete_video(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_publish(&self, id: Uuid, owner: Uuid) -> anyhow::Result<Option<Video>> {
        let row: Option<VideoRow> = sqlx::query_as(&format!(
            "UPDATE videos SET is_published = NOT is_published, updated_at = ? \
             WHERE id = ? AND owner = ? RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(ts(Utc::now()))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Video::from))
    }
}
