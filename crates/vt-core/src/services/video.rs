//! Video operations, including the upload/commit/purge sequence used when
//! assets and records change together.
//!
//! The database row is the source of truth. An asset is purged only after
//! the row stops pointing at it (old thumbnail) or when the row never came
//! to point at it (failed commit). Purges are best-effort: a failed purge
//! leaks an orphaned asset on the host but never touches committed state,
//! and nothing is retried.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{upstream, AppError, Result};
use crate::media::{asset_id_from_url, MediaKind, UploadFile, UploadedAsset};
use crate::models::{timestamp_now, Video, VideoDetail, VideoSummary, VideoUpdate};
use crate::pagination::{Page, PageRequest, VideoSort};
use crate::traits::{MediaStore, VideoQuery, VideoRepo};
use crate::validate::{parse_id, require_actor, required_text};

#[derive(Debug, Clone, Default)]
pub struct ListVideos {
    pub user_id: Option<String>,
    pub query: Option<String>,
    pub sort: VideoSort,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default)]
pub struct PublishVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_file: Option<UploadFile>,
    pub thumbnail: Option<UploadFile>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<UploadFile>,
}

/// One owner's videos. Drafts are visible only to the owner.
pub async fn list(
    repo: &dyn VideoRepo,
    actor: Option<Uuid>,
    params: ListVideos,
) -> Result<Page<VideoSummary>> {
    let raw_owner = params
        .user_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::ValidationFailed("userId field is required".to_string()))?;
    let owner = parse_id(raw_owner, "userId")?;

    let query = VideoQuery {
        owner,
        search: params
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
        include_unpublished: actor == Some(owner),
        sort: params.sort,
        page: params.page,
    };
    repo.list_videos(query)
        .await
        .map_err(upstream("Failed to fetch videos"))
}

pub async fn publish(
    repo: &dyn VideoRepo,
    media: &dyn MediaStore,
    actor: Option<Uuid>,
    input: PublishVideo,
) -> Result<Video> {
    let owner = require_actor(actor)?;
    let title = required_text(input.title.as_deref(), "Title and description are required")?;
    let description =
        required_text(input.description.as_deref(), "Title and description are required")?;
    let video_file = input
        .video_file
        .ok_or_else(|| AppError::ValidationFailed("Video file is required".to_string()))?;
    let thumbnail = input
        .thumbnail
        .ok_or_else(|| AppError::ValidationFailed("Thumbnail file is required".to_string()))?;

    let upload_failed = "Error while uploading video or thumbnail";
    let video_asset = media
        .upload(video_file, MediaKind::Video)
        .await
        .map_err(upstream(upload_failed))?;
    let thumb_asset = match media.upload(thumbnail, MediaKind::Image).await {
        Ok(asset) => asset,
        Err(err) => {
            purge(media, &video_asset.public_id, MediaKind::Video).await;
            return Err(upstream(upload_failed)(err));
        }
    };

    let now = timestamp_now();
    let video = Video {
        id: Uuid::now_v7(),
        video_file: video_asset.url.clone(),
        thumbnail: thumb_asset.url.clone(),
        title,
        description,
        duration: video_asset.duration.unwrap_or(0.0),
        views: 0,
        is_published: true,
        owner,
        created_at: now,
        updated_at: now,
    };

    if let Err(err) = repo.insert_video(video.clone()).await {
        purge_all(media, &[(&video_asset, MediaKind::Video), (&thumb_asset, MediaKind::Image)]).await;
        return Err(upstream("Failed to save video")(err));
    }

    info!(video_id = %video.id, %owner, "video published");
    Ok(video)
}

/// Fetching a video counts as a view. Unpublished videos are not found.
pub async fn get(repo: &dyn VideoRepo, video_id: &str) -> Result<VideoDetail> {
    let id = parse_id(video_id, "videoId")?;
    repo.view_video(id)
        .await
        .map_err(upstream("Failed to fetch video"))?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
}

/// Replaces title, description and thumbnail.
///
/// Sequence: validate → upload new thumbnail → commit row → purge old
/// thumbnail. If the commit fails or matches no row, the new thumbnail is
/// purged instead and the row is left as it was.
pub async fn update(
    repo: &dyn VideoRepo,
    media: &dyn MediaStore,
    actor: Option<Uuid>,
    video_id: &str,
    input: UpdateVideo,
) -> Result<Video> {
    let owner = require_actor(actor)?;
    let id = parse_id(video_id, "videoId")?;
    let title = required_text(input.title.as_deref(), "title required")?;
    let description = required_text(input.description.as_deref(), "description required")?;
    let thumbnail = input
        .thumbnail
        .ok_or_else(|| AppError::ValidationFailed("Thumbnail file is missing".to_string()))?;

    let existing = repo
        .find_owned_video(id, owner)
        .await
        .map_err(upstream("Failed to fetch video"))?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    let uploaded = media
        .upload(thumbnail, MediaKind::Image)
        .await
        .map_err(upstream("Thumbnail upload failed"))?;

    let update = VideoUpdate {
        title,
        description,
        thumbnail: uploaded.url.clone(),
    };
    let committed = match repo.update_video_details(id, owner, update).await {
        Ok(Some(video)) => video,
        Ok(None) => {
            warn!(video_id = %id, "video vanished before thumbnail commit");
            purge(media, &uploaded.public_id, MediaKind::Image).await;
            return Err(AppError::Upstream("Video update failed".to_string()));
        }
        Err(err) => {
            purge(media, &uploaded.public_id, MediaKind::Image).await;
            return Err(upstream("Video update failed")(err));
        }
    };

    // A content-addressed host may hand back the same id for identical bytes.
    if let Some(old_id) = asset_id_from_url(&existing.thumbnail) {
        if old_id != uploaded.public_id {
            purge(media, old_id, MediaKind::Image).await;
        }
    }

    Ok(committed)
}

pub async fn delete(repo: &dyn VideoRepo, actor: Option<Uuid>, video_id: &str) -> Result<()> {
    let owner = require_actor(actor)?;
    let id = parse_id(video_id, "videoId")?;
    let deleted = repo
        .delete_video(id, owner)
        .await
        .map_err(upstream("Failed to delete video"))?;
    if !deleted {
        return Err(AppError::NotFound("Video not found or not authorized".to_string()));
    }
    Ok(())
}

pub async fn toggle_publish(
    repo: &dyn VideoRepo,
    actor: Option<Uuid>,
    video_id: &str,
) -> Result<Video> {
    let owner = require_actor(actor)?;
    let id = parse_id(video_id, "videoId")?;
    repo.toggle_publish(id, owner)
        .await
        .map_err(upstream("Failed to update video"))?
        .ok_or_else(|| AppError::NotFound("Video not found or unauthorized".to_string()))
}

async fn purge(media: &dyn MediaStore, asset_id: &str, kind: MediaKind) {
    match media.delete(asset_id, kind).await {
        Ok(()) => info!(asset_id, kind = kind.as_str(), "asset purged"),
        Err(err) => warn!(asset_id, kind = kind.as_str(), error = %err, "asset purge failed, asset orphaned"),
    }
}

async fn purge_all(media: &dyn MediaStore, assets: &[(&UploadedAsset, MediaKind)]) {
    for (asset, kind) in assets {
        purge(media, &asset.public_id, *kind).await;
    }
}
