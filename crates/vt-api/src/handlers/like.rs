use axum::extract::{Path, State};
use serde_json::{json, Value};
use vt_core::services::like;
use vt_core::{LikeKind, LikedVideo};

use crate::extract::Actor;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

async fn toggle(state: &AppState, actor: Actor, kind: LikeKind, target_id: &str) -> ApiResult<Value> {
    let liked = like::toggle(state.likes.as_ref(), actor.0, kind, target_id).await?;
    let noun = match kind {
        LikeKind::Video => "Video",
        LikeKind::Comment => "Comment",
        LikeKind::Tweet => "Tweet",
    };
    let verb = if liked { "liked" } else { "unliked" };
    Ok(ApiResponse::ok(
        json!({ "isLiked": liked }),
        format!("{noun} {verb} successfully"),
    ))
}

pub async fn toggle_video_like(
    State(state): State<AppState>,
    actor: Actor,
    Path(video_id): Path<String>,
) -> ApiResult<Value> {
    toggle(&state, actor, LikeKind::Video, &video_id).await
}

pub async fn toggle_comment_like(
    State(state): State<AppState>,
    actor: Actor,
    Path(comment_id): Path<String>,
) -> ApiResult<Value> {
    toggle(&state, actor, LikeKind::Comment, &comment_id).await
}

pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    actor: Actor,
    Path(tweet_id): Path<String>,
) -> ApiResult<Value> {
    toggle(&state, actor, LikeKind::Tweet, &tweet_id).await
}

pub async fn liked_videos(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<Vec<LikedVideo>> {
    let videos = like::liked_videos(state.likes.as_ref(), actor).await?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}
