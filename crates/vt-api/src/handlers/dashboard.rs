use axum::extract::State;
use vt_core::services::dashboard;
use vt_core::{ChannelStats, ChannelVideo};

use crate::extract::Actor;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn channel_stats(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<ChannelStats> {
    let stats = dashboard::stats(state.dashboard.as_ref(), actor).await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

pub async fn channel_videos(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<Vec<ChannelVideo>> {
    let videos = dashboard::channel_videos(state.dashboard.as_ref(), actor).await?;
    Ok(ApiResponse::ok(videos, "Your videos fetched successfully"))
}
