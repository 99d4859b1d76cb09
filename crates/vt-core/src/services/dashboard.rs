use uuid::Uuid;

use crate::error::{upstream, Result};
use crate::models::{ChannelStats, ChannelVideo};
use crate::traits::DashboardRepo;
use crate::validate::require_actor;

/// Totals for the actor's own channel.
pub async fn stats(repo: &dyn DashboardRepo, actor: Option<Uuid>) -> Result<ChannelStats> {
    let channel = require_actor(actor)?;
    repo.channel_stats(channel)
        .await
        .map_err(upstream("Failed to fetch channel stats"))
}

pub async fn channel_videos(repo: &dyn DashboardRepo, actor: Option<Uuid>) -> Result<Vec<ChannelVideo>> {
    let channel = require_actor(actor)?;
    repo.channel_videos(channel)
        .await
        .map_err(upstream("Failed to fetch channel videos"))
}
