use uuid::Uuid;

use crate::error::{upstream, AppError, Result};
use crate::models::{timestamp_now, Subscription, UserSummary};
use crate::traits::SubscriptionRepo;
use crate::validate::{parse_id, require_actor};

/// Subscribes the actor to `channel_id`, or unsubscribes if already
/// subscribed. Returns whether the actor is subscribed afterwards.
pub async fn toggle(
    repo: &dyn SubscriptionRepo,
    actor: Option<Uuid>,
    channel_id: &str,
) -> Result<bool> {
    let subscriber = require_actor(actor)?;
    let channel = parse_id(channel_id, "channelId")?;
    if channel == subscriber {
        return Err(AppError::ValidationFailed(
            "You cannot subscribe to yourself".to_string(),
        ));
    }

    let subscription = Subscription {
        id: Uuid::now_v7(),
        subscriber,
        channel,
        created_at: timestamp_now(),
    };
    repo.toggle_subscription(subscription)
        .await
        .map_err(upstream("Failed to toggle subscription"))
}

pub async fn subscribers(repo: &dyn SubscriptionRepo, channel_id: &str) -> Result<Vec<UserSummary>> {
    let channel = parse_id(channel_id, "channelId")?;
    repo.subscribers(channel)
        .await
        .map_err(upstream("Failed to fetch subscribers"))
}

pub async fn subscribed_channels(
    repo: &dyn SubscriptionRepo,
    subscriber_id: &str,
) -> Result<Vec<UserSummary>> {
    let subscriber = parse_id(subscriber_id, "subscriberId")?;
    repo.subscribed_channels(subscriber)
        .await
        .map_err(upstream("Failed to fetch subscribed channels"))
}
