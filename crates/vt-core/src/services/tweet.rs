use uuid::Uuid;

use crate::error::{upstream, AppError, Result};
use crate::models::{timestamp_now, Tweet, TweetView};
use crate::pagination::{Page, PageRequest};
use crate::traits::TweetRepo;
use crate::validate::{parse_id, require_actor, required_text};

const NOT_OWNED: &str = "Tweet not found or not authorized";

pub async fn create(repo: &dyn TweetRepo, actor: Option<Uuid>, content: Option<&str>) -> Result<Tweet> {
    let owner = require_actor(actor)?;
    let content = required_text(content, "Content is required")?;

    let now = timestamp_now();
    let tweet = Tweet {
        id: Uuid::now_v7(),
        content,
        owner,
        created_at: now,
        updated_at: now,
    };
    repo.insert_tweet(tweet.clone())
        .await
        .map_err(upstream("Failed to create tweet"))?;
    Ok(tweet)
}

pub async fn list_for_user(
    repo: &dyn TweetRepo,
    user_id: &str,
    page: PageRequest,
) -> Result<Page<TweetView>> {
    let owner = parse_id(user_id, "userId")?;
    repo.tweets_by_owner(owner, page)
        .await
        .map_err(upstream("Failed to fetch tweets"))
}

pub async fn update(
    repo: &dyn TweetRepo,
    actor: Option<Uuid>,
    tweet_id: &str,
    content: Option<&str>,
) -> Result<Tweet> {
    let owner = require_actor(actor)?;
    let id = parse_id(tweet_id, "tweetId")?;
    let content = required_text(content, "Content is required")?;
    repo.update_tweet(id, owner, content)
        .await
        .map_err(upstream("Failed to update tweet"))?
        .ok_or_else(|| AppError::NotFound(NOT_OWNED.to_string()))
}

pub async fn delete(repo: &dyn TweetRepo, actor: Option<Uuid>, tweet_id: &str) -> Result<()> {
    let owner = require_actor(actor)?;
    let id = parse_id(tweet_id, "tweetId")?;
    let deleted = repo
        .delete_tweet(id, owner)
        .await
        .map_err(upstream("Failed to delete tweet"))?;
    if !deleted {
        return Err(AppError::NotFound(NOT_OWNED.to_string()));
    }
    Ok(())
}
