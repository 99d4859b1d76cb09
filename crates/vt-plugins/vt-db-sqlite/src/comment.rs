use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use vt_core::pagination::{Page, PageRequest};
use vt_core::{Comment, CommentRepo, CommentView};

use crate::{into_page, ts, user_summary, FacetRow, SqliteStore};

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    content: String,
    video: Uuid,
    owner: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            content: row.content,
            video: row.video,
            owner: row.owner,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CommentViewRow {
    total: i64,
    id: Option<Uuid>,
    content: Option<String>,
    created_at: Option<DateTime<Utc>>,
    owner_id: Option<Uuid>,
    username: Option<String>,
    avatar: Option<String>,
}

impl FacetRow for CommentViewRow {
    type Item = CommentView;

    fn total(&self) -> i64 {
        self.total
    }

    fn into_item(self) -> Option<CommentView> {
        Some(CommentView {
            id: self.id?,
            content: self.content?,
            created_at: self.created_at?,
            owner: user_summary(self.owner_id, self.username, self.avatar),
        })
    }
}

#[async_trait]
impl CommentRepo for SqliteStore {
    async fn comments_for_video(
        &self,
        video: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<Page<CommentView>> {
        let rows: Vec<CommentViewRow> = sqlx::query_as(
            "WITH filtered AS ( \
                 SELECT id, content, owner, created_at FROM comments WHERE video = ?1 \
             ), \
             slice AS ( \
                 SELECT * FROM filtered ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3 \
             ) \
             SELECT t.total, s.id, s.content, s.created_at, \
                    u.id AS owner_id, u.username, u.avatar \
             FROM (SELECT COUNT(*) AS total FROM filtered) AS t \
             LEFT JOIN slice AS s ON 1 = 1 \
             LEFT JOIN users AS u ON u.id = s.owner \
             ORDER BY s.created_at DESC, s.id DESC",
        )
        .bind(video)
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(into_page(rows, page))
    }

    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, content, video, owner, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(comment.id)
        .bind(comment.content)
        .bind(comment.video)
        .bind(comment.owner)
        .bind(ts(comment.created_at))
        .bind(ts(comment.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_comment(
        &self,
        id: Uuid,
        owner: Uuid,
        content: String,
    ) -> anyhow::Result<Option<Comment>> {
        let row: Option<CommentRow> = sqlx::query_as(
            "UPDATE comments SET content = ?, updated_at = ? WHERE id = ? AND owner = ? \
             RETURNING id, content, video, owner, created_at, updated_at",
        )
        .bind(content)
        .bind(ts(Utc::now()))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Comment::from))
    }

    async fn delete_comment(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
