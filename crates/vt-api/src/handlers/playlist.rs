use axum::extract::{Path, State};
use serde_json::{json, Value};
use vt_core::services::playlist;
use vt_core::Playlist;

use crate::extract::{Actor, Body, PlaylistBody};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn create_playlist(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Body(body): Body<PlaylistBody>,
) -> ApiResult<Playlist> {
    let created = playlist::create(
        state.playlists.as_ref(),
        actor,
        body.name.as_deref(),
        body.description.as_deref(),
    )
    .await?;
    Ok(ApiResponse::created(created, "Playlist created successfully"))
}

pub async fn user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Playlist>> {
    let playlists = playlist::list_for_user(state.playlists.as_ref(), &user_id).await?;
    Ok(ApiResponse::ok(playlists, "User playlists fetched successfully"))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<Playlist> {
    let found = playlist::get(state.playlists.as_ref(), &playlist_id).await?;
    Ok(ApiResponse::ok(found, "Playlist fetched successfully"))
}

pub async fn update_playlist(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(playlist_id): Path<String>,
    Body(body): Body<PlaylistBody>,
) -> ApiResult<Playlist> {
    let updated = playlist::update(
        state.playlists.as_ref(),
        actor,
        &playlist_id,
        body.name.as_deref(),
        body.description.as_deref(),
    )
    .await?;
    Ok(ApiResponse::ok(updated, "Playlist updated successfully"))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(playlist_id): Path<String>,
) -> ApiResult<Value> {
    playlist::delete(state.playlists.as_ref(), actor, &playlist_id).await?;
    Ok(ApiResponse::ok(json!({}), "Playlist deleted successfully"))
}

pub async fn add_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<Playlist> {
    let updated =
        playlist::add_video(state.playlists.as_ref(), actor, &playlist_id, &video_id).await?;
    Ok(ApiResponse::ok(updated, "Video added to playlist successfully"))
}

pub async fn remove_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<Playlist> {
    let updated =
        playlist::remove_video(state.playlists.as_ref(), actor, &playlist_id, &video_id).await?;
    Ok(ApiResponse::ok(updated, "Video removed from playlist successfully"))
}
