use axum::extract::{Path, Query, State};
use serde_json::{json, Value};
use vt_core::services::tweet;
use vt_core::{Page, Tweet, TweetView};

use crate::extract::{Actor, Body, ContentBody, PageQuery};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn create_tweet(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Body(body): Body<ContentBody>,
) -> ApiResult<Tweet> {
    let created = tweet::create(state.tweets.as_ref(), actor, body.content.as_deref()).await?;
    Ok(ApiResponse::created(created, "Tweet created successfully"))
}

pub async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<TweetView>> {
    let page = tweet::list_for_user(state.tweets.as_ref(), &user_id, query.request()).await?;
    Ok(ApiResponse::ok(page, "Tweets fetched successfully"))
}

pub async fn update_tweet(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(tweet_id): Path<String>,
    Body(body): Body<ContentBody>,
) -> ApiResult<Tweet> {
    let updated =
        tweet::update(state.tweets.as_ref(), actor, &tweet_id, body.content.as_deref()).await?;
    Ok(ApiResponse::ok(updated, "Tweet updated"))
}

pub async fn delete_tweet(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(tweet_id): Path<String>,
) -> ApiResult<Value> {
    tweet::delete(state.tweets.as_ref(), actor, &tweet_id).await?;
    Ok(ApiResponse::ok(json!({}), "Tweet deleted successfully"))
}
