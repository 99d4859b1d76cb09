use uuid::Uuid;

use crate::error::{upstream, Result};
use crate::models::{timestamp_now, Like, LikeKind, LikeTarget, LikedVideo};
use crate::traits::LikeRepo;
use crate::validate::{parse_id, require_actor};

/// Flips the actor's like on a video, comment or tweet. Returns whether the
/// target is liked afterwards.
pub async fn toggle(
    repo: &dyn LikeRepo,
    actor: Option<Uuid>,
    kind: LikeKind,
    target_id: &str,
) -> Result<bool> {
    let liked_by = require_actor(actor)?;
    let target_id = parse_id(target_id, kind.id_param())?;

    let like = Like {
        id: Uuid::now_v7(),
        target: LikeTarget { kind, target_id },
        liked_by,
        created_at: timestamp_now(),
    };
    repo.toggle_like(like)
        .await
        .map_err(upstream("Failed to toggle like"))
}

pub async fn liked_videos(repo: &dyn LikeRepo, actor: Option<Uuid>) -> Result<Vec<LikedVideo>> {
    let user = require_actor(actor)?;
    repo.liked_videos(user)
        .await
        .map_err(upstream("Failed to fetch liked videos"))
}
