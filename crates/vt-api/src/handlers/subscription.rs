use axum::extract::{Path, State};
use serde_json::{json, Value};
use vt_core::services::subscription;
use vt_core::UserSummary;

use crate::extract::Actor;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn toggle_subscription(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(channel_id): Path<String>,
) -> ApiResult<Value> {
    let subscribed = subscription::toggle(state.subscriptions.as_ref(), actor, &channel_id).await?;
    let message = if subscribed {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };
    Ok(ApiResponse::ok(json!({ "isSubscribed": subscribed }), message))
}

pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<Vec<UserSummary>> {
    let users = subscription::subscribers(state.subscriptions.as_ref(), &channel_id).await?;
    Ok(ApiResponse::ok(users, "Subscribers fetched successfully"))
}

pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> ApiResult<Vec<UserSummary>> {
    let channels =
        subscription::subscribed_channels(state.subscriptions.as_ref(), &subscriber_id).await?;
    Ok(ApiResponse::ok(channels, "Subscribed channels fetched successfully"))
}
