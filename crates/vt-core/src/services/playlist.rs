use uuid::Uuid;

use crate::error::{upstream, AppError, Result};
use crate::models::{timestamp_now, Playlist};
use crate::traits::PlaylistRepo;
use crate::validate::{optional_text, parse_id, require_actor, required_text};

const NOT_OWNED: &str = "Playlist not found or not authorized";

pub async fn create(
    repo: &dyn PlaylistRepo,
    actor: Option<Uuid>,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Playlist> {
    let owner = require_actor(actor)?;
    let name = required_text(name, "Name is required")?;

    let now = timestamp_now();
    let playlist = Playlist {
        id: Uuid::now_v7(),
        name,
        description: optional_text(description),
        videos: Vec::new(),
        owner,
        created_at: now,
        updated_at: now,
    };
    repo.insert_playlist(playlist.clone())
        .await
        .map_err(upstream("Error creating the playlist"))?;
    Ok(playlist)
}

pub async fn list_for_user(repo: &dyn PlaylistRepo, user_id: &str) -> Result<Vec<Playlist>> {
    let owner = parse_id(user_id, "userId")?;
    repo.playlists_by_owner(owner)
        .await
        .map_err(upstream("Failed to fetch playlists"))
}

pub async fn get(repo: &dyn PlaylistRepo, playlist_id: &str) -> Result<Playlist> {
    let id = parse_id(playlist_id, "playlistId")?;
    repo.find_playlist(id)
        .await
        .map_err(upstream("Failed to fetch playlist"))?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))
}

pub async fn update(
    repo: &dyn PlaylistRepo,
    actor: Option<Uuid>,
    playlist_id: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Playlist> {
    let owner = require_actor(actor)?;
    let id = parse_id(playlist_id, "playlistId")?;
    let name = required_text(name, "name is required")?;
    repo.update_playlist(id, owner, name, optional_text(description))
        .await
        .map_err(upstream("Failed to update playlist"))?
        .ok_or_else(|| AppError::NotFound(NOT_OWNED.to_string()))
}

pub async fn delete(repo: &dyn PlaylistRepo, actor: Option<Uuid>, playlist_id: &str) -> Result<()> {
    let owner = require_actor(actor)?;
    let id = parse_id(playlist_id, "playlistId")?;
    let deleted = repo
        .delete_playlist(id, owner)
        .await
        .map_err(upstream("Failed to delete playlist"))?;
    if !deleted {
        return Err(AppError::NotFound(NOT_OWNED.to_string()));
    }
    Ok(())
}

pub async fn add_video(
    repo: &dyn PlaylistRepo,
    actor: Option<Uuid>,
    playlist_id: &str,
    video_id: &str,
) -> Result<Playlist> {
    let owner = require_actor(actor)?;
    let id = parse_id(playlist_id, "playlistId")?;
    let video = parse_id(video_id, "videoId")?;
    repo.add_playlist_video(id, owner, video)
        .await
        .map_err(upstream("Failed to add video to playlist"))?
        .ok_or_else(|| AppError::NotFound(NOT_OWNED.to_string()))
}

pub async fn remove_video(
    repo: &dyn PlaylistRepo,
    actor: Option<Uuid>,
    playlist_id: &str,
    video_id: &str,
) -> Result<Playlist> {
    let owner = require_actor(actor)?;
    let id = parse_id(playlist_id, "playlistId")?;
    let video = parse_id(video_id, "videoId")?;
    repo.remove_playlist_video(id, owner, video)
        .await
        .map_err(upstream("Failed to remove video from playlist"))?
        .ok_or_else(|| AppError::NotFound(NOT_OWNED.to_string()))
}
