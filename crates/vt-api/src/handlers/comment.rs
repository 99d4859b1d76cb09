use axum::extract::{Path, Query, State};
use serde_json::{json, Value};
use vt_core::services::comment;
use vt_core::{Comment, CommentView, Page};

use crate::extract::{Actor, Body, ContentBody, PageQuery};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<CommentView>> {
    let page = comment::list(state.comments.as_ref(), &video_id, query.request()).await?;
    Ok(ApiResponse::ok(page, "Comments fetched successfully"))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
    Body(body): Body<ContentBody>,
) -> ApiResult<Comment> {
    let created = comment::add(
        state.comments.as_ref(),
        actor,
        &video_id,
        body.content.as_deref(),
    )
    .await?;
    Ok(ApiResponse::created(created, "Comment added"))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(comment_id): Path<String>,
    Body(body): Body<ContentBody>,
) -> ApiResult<Comment> {
    let updated = comment::update(
        state.comments.as_ref(),
        actor,
        &comment_id,
        body.content.as_deref(),
    )
    .await?;
    Ok(ApiResponse::ok(updated, "Comment updated successfully"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(comment_id): Path<String>,
) -> ApiResult<Value> {
    comment::delete(state.comments.as_ref(), actor, &comment_id).await?;
    Ok(ApiResponse::ok(json!({}), "Comment deleted successfully"))
}
