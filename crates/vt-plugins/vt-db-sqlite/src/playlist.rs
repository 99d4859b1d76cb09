use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;
use vt_core::{Playlist, PlaylistRepo};

use crate::{ts, SqliteStore};

const PLAYLIST_COLUMNS: &str = "id, name, description, owner, created_at, updated_at";

#[derive(FromRow)]
struct PlaylistRow {
    id: Uuid,
    name: String,
    description: String,
    owner: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlaylistRow {
    fn with_videos(self, videos: Vec<Uuid>) -> Playlist {
        Playlist {
            id: self.id,
            name: self.name,
            description: self.description,
            videos,
            owner: self.owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

async fn member_ids(conn: &mut SqliteConnection, playlist: Uuid) -> sqlx::Result<Vec<Uuid>> {
    sqlx::query_scalar("SELECT video_id FROM playlist_videos WHERE playlist_id = ? ORDER BY position")
        .bind(playlist)
        .fetch_all(conn)
        .await
}

enum Change {
    Rename { name: String, description: String },
    Add(Uuid),
    Remove(Uuid),
}

/// Applies `change` to a playlist the caller owns and returns the refreshed
/// record. `None` when the playlist is missing or foreign.
async fn apply_owned(
    store: &SqliteStore,
    id: Uuid,
    owner: Uuid,
    change: Change,
) -> anyhow::Result<Option<Playlist>> {
    let mut tx = store.pool.begin().await?;

    let touched = sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ? AND owner = ?")
        .bind(ts(Utc::now()))
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if touched == 0 {
        return Ok(None);
    }

    match change {
        Change::Rename { name, description } => {
            sqlx::query("UPDATE playlists SET name = ?, description = ? WHERE id = ?")
                .bind(name)
                .bind(description)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        Change::Add(video) => {
            sqlx::query(
                "INSERT OR IGNORE INTO playlist_videos (playlist_id, video_id, position) \
                 SELECT ?1, ?2, COALESCE(MAX(position), 0) + 1 FROM playlist_videos WHERE playlist_id = ?1",
            )
            .bind(id)
            .bind(video)
            .execute(&mut *tx)
            .await?;
        }
        Change::Remove(video) => {
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ? AND video_id = ?")
                .bind(id)
                .bind(video)
                .execute(&mut *tx)
                .await?;
        }
    }

    let row: PlaylistRow =
        sqlx::query_as(&format!("SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
    let videos = member_ids(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Some(row.with_videos(videos)))
}

#[async_trait]
impl PlaylistRepo for SqliteStore {
    async fn insert_playlist(&self, playlist: Playlist) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO playlists (id, name, description, owner, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(playlist.id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.owner)
        .bind(ts(playlist.created_at))
        .bind(ts(playlist.updated_at))
        .execute(&mut *tx)
        .await?;
        for (position, video) in playlist.videos.iter().enumerate() {
            sqlx::query(
                "INSERT OR IGNORE INTO playlist_videos (playlist_id, video_id, position) VALUES (?, ?, ?)",
            )
            .bind(playlist.id)
            .bind(video)
            .bind(position as i64 + 1)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn playlists_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Playlist>> {
        let rows: Vec<PlaylistRow> = sqlx::query_as(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE owner = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let members: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT pv.playlist_id, pv.video_id FROM playlist_videos AS pv \
             JOIN playlists AS p ON p.id = pv.playlist_id \
             WHERE p.owner = ? ORDER BY pv.playlist_id, pv.position",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut by_playlist: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (playlist, video) in members {
            by_playlist.entry(playlist).or_default().push(video);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let videos = by_playlist.remove(&row.id).unwrap_or_default();
                row.with_videos(videos)
            })
            .collect())
    }

    async fn find_playlist(&self, id: Uuid) -> anyhow::Result<Option<Playlist>> {
        let mut conn = self.pool.acquire().await?;
        let row: Option<PlaylistRow> =
            sqlx::query_as(&format!("SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let videos = member_ids(&mut conn, id).await?;
        Ok(Some(row.with_videos(videos)))
    }

    async fn update_playlist(
        &self,
        id: Uuid,
        owner: Uuid,
        name: String,
        description: String,
    ) -> anyhow::Result<Option<Playlist>> {
        apply_owned(self, id, owner, Change::Rename { name, description }).await
    }

    async fn delete_playlist(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM playlists WHERE id = ? AND owner = ?")
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted > 0 {
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn add_playlist_video(
        &self,
        id: Uuid,
        owner: Uuid,
        video: Uuid,
    ) -> anyhow::Result<Option<Playlist>> {
        apply_owned(self, id, owner, Change::Add(video)).await
    }

    async fn remove_playlist_video(
        &self,
        id: Uuid,
        owner: Uuid,
        video: Uuid,
    ) -> anyhow::Result<Option<Playlist>> {
        apply_owned(self, id, owner, Change::Remove(video)).await
    }
}
