use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{Path, Query, State};
use serde_json::{json, Value};
use vt_core::services::video::{self, PublishVideo, UpdateVideo};
use vt_core::{Page, Video, VideoDetail, VideoSummary};

use crate::extract::{Actor, FormData, VideoListQuery};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list_videos(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<VideoListQuery>,
) -> ApiResult<Page<VideoSummary>> {
    let page = video::list(state.videos.as_ref(), actor, query.into()).await?;
    Ok(ApiResponse::ok(page, "Videos fetched successfully"))
}

/// Multipart fields: `title`, `description`, `videoFile`, `thumbnail`.
pub async fn publish_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Video> {
    let mut form = FormData::read(multipart).await?;
    let input = PublishVideo {
        title: form.text("title"),
        description: form.text("description"),
        video_file: form.take_file("videoFile"),
        thumbnail: form.take_file("thumbnail"),
    };
    let video = video::publish(state.videos.as_ref(), state.media.as_ref(), actor, input).await?;
    Ok(ApiResponse::created(video, "Video published successfully"))
}

pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<VideoDetail> {
    let video = video::get(state.videos.as_ref(), &video_id).await?;
    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

/// Multipart fields: `title`, `description`, `thumbnail`.
pub async fn update_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Video> {
    let mut form = FormData::read(multipart).await?;
    let input = UpdateVideo {
        title: form.text("title"),
        description: form.text("description"),
        thumbnail: form.take_file("thumbnail"),
    };
    let video = video::update(
        state.videos.as_ref(),
        state.media.as_ref(),
        actor,
        &video_id,
        input,
    )
    .await?;
    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
) -> ApiResult<Value> {
    video::delete(state.videos.as_ref(), actor, &video_id).await?;
    Ok(ApiResponse::ok(json!({}), "Video deleted successfully"))
}

pub async fn toggle_publish(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
) -> ApiResult<Video> {
    let video = video::toggle_publish(state.videos.as_ref(), actor, &video_id).await?;
    let visibility = if video.is_published { "public" } else { "private" };
    Ok(ApiResponse::ok(video, format!("Video is now {visibility}")))
}
