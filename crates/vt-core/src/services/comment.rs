use uuid::Uuid;

use crate::error::{upstream, AppError, Result};
use crate::models::{timestamp_now, Comment, CommentView};
use crate::pagination::{Page, PageRequest};
use crate::traits::CommentRepo;
use crate::validate::{parse_id, require_actor, required_text};

pub async fn list(
    repo: &dyn CommentRepo,
    video_id: &str,
    page: PageRequest,
) -> Result<Page<CommentView>> {
    let video = parse_id(video_id, "videoId")?;
    repo.comments_for_video(video, page)
        .await
        .map_err(upstream("Failed to fetch comments"))
}

pub async fn add(
    repo: &dyn CommentRepo,
    actor: Option<Uuid>,
    video_id: &str,
    content: Option<&str>,
) -> Result<Comment> {
    let owner = require_actor(actor)?;
    let video = parse_id(video_id, "videoId")?;
    let content = required_text(content, "Comment content required")?;

    let now = timestamp_now();
    let comment = Comment {
        id: Uuid::now_v7(),
        content,
        video,
        owner,
        created_at: now,
        updated_at: now,
    };
    repo.insert_comment(comment.clone())
        .await
        .map_err(upstream("Failed to add comment"))?;
    Ok(comment)
}

pub async fn update(
    repo: &dyn CommentRepo,
    actor: Option<Uuid>,
    comment_id: &str,
    content: Option<&str>,
) -> Result<Comment> {
    let owner = require_actor(actor)?;
    let id = parse_id(comment_id, "commentId")?;
    let content = required_text(content, "content required")?;
    repo.update_comment(id, owner, content)
        .await
        .map_err(upstream("Failed to update comment"))?
        .ok_or_else(|| AppError::NotFound("Comment not found or not authorized".to_string()))
}

pub async fn delete(repo: &dyn CommentRepo, actor: Option<Uuid>, comment_id: &str) -> Result<()> {
    let owner = require_actor(actor)?;
    let id = parse_id(comment_id, "commentId")?;
    let deleted = repo
        .delete_comment(id, owner)
        .await
        .map_err(upstream("Failed to delete comment"))?;
    if !deleted {
        return Err(AppError::NotFound("Comment not found or not authorized".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockCommentRepo;

    #[tokio::test]
    async fn add_trims_and_scopes_to_video() {
        let owner = Uuid::now_v7();
        let video = Uuid::now_v7();
        let mut repo = MockCommentRepo::new();
        repo.expect_insert_comment()
            .withf(move |c| c.owner == owner && c.video == video && c.content == "nice")
            .times(1)
            .returning(|_| Ok(()));

        let comment = add(&repo, Some(owner), &video.to_string(), Some("  nice \n"))
            .await
            .unwrap();
        assert_eq!(comment.content, "nice");
    }

    #[tokio::test]
    async fn blank_content_never_reaches_the_store() {
        let repo = MockCommentRepo::new();
        let err = add(&repo, Some(Uuid::now_v7()), &Uuid::now_v7().to_string(), Some("  "))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::ValidationFailed("Comment content required".into()));

        let err = update(&repo, Some(Uuid::now_v7()), &Uuid::now_v7().to_string(), None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn non_owner_update_and_delete_look_missing() {
        let mut repo = MockCommentRepo::new();
        repo.expect_update_comment().returning(|_, _, _| Ok(None));
        repo.expect_delete_comment().returning(|_, _| Ok(false));
        let actor = Some(Uuid::now_v7());
        let id = Uuid::now_v7().to_string();

        let upd = update(&repo, actor, &id, Some("x")).await.unwrap_err();
        let del = delete(&repo, actor, &id).await.unwrap_err();
        assert_eq!(upd, del);
        assert_eq!(upd.status_code(), 404);
    }

    #[tokio::test]
    async fn list_rejects_malformed_video_id() {
        let repo = MockCommentRepo::new();
        let err = list(&repo, "123", PageRequest::default()).await.unwrap_err();
        assert_eq!(err, AppError::InvalidIdentifier("Invalid videoId".into()));
    }
}
