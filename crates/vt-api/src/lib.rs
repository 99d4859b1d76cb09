//! # vt-api
//!
//! The web routing and orchestration layer. Every route lives under
//! `/api/v1`; handlers extract the actor and inputs, call one service
//! function from `vt_core::services`, and wrap the result in the envelope.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod state;

use axum::routing::{get, patch, post};
use axum::Router;

pub use middleware::HttpOptions;
pub use state::AppState;

/// Builds the full application router with the standard middleware stack.
pub fn app(state: AppState, options: &HttpOptions) -> Router {
    let api = Router::new()
        .route("/healthcheck", get(handlers::health::healthcheck))
        .merge(video_routes())
        .merge(comment_routes())
        .merge(like_routes())
        .merge(playlist_routes())
        .merge(subscription_routes())
        .merge(tweet_routes())
        .merge(dashboard_routes());

    let router = Router::new().nest("/api/v1", api).with_state(state);
    middleware::apply(router, options)
}

fn video_routes() -> Router<AppState> {
    use handlers::video::*;
    Router::new()
        .route("/videos", get(list_videos).post(publish_video))
        .route(
            "/videos/{videoId}",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/videos/toggle/publish/{videoId}", patch(toggle_publish))
}

fn comment_routes() -> Router<AppState> {
    use handlers::comment::*;
    Router::new()
        .route("/comments/{videoId}", get(list_comments).post(add_comment))
        .route(
            "/comments/c/{commentId}",
            patch(update_comment).delete(delete_comment),
        )
}

fn like_routes() -> Router<AppState> {
    use handlers::like::*;
    Router::new()
        .route("/likes/toggle/v/{videoId}", post(toggle_video_like))
        .route("/likes/toggle/c/{commentId}", post(toggle_comment_like))
        .route("/likes/toggle/t/{tweetId}", post(toggle_tweet_like))
        .route("/likes/videos", get(liked_videos))
}

fn playlist_routes() -> Router<AppState> {
    use handlers::playlist::*;
    Router::new()
        .route("/playlist", post(create_playlist))
        .route("/playlist/user/{userId}", get(user_playlists))
        .route(
            "/playlist/{playlistId}",
            get(get_playlist).patch(update_playlist).delete(delete_playlist),
        )
        .route("/playlist/add/{videoId}/{playlistId}", patch(add_video))
        .route("/playlist/remove/{videoId}/{playlistId}", patch(remove_video))
}

fn subscription_routes() -> Router<AppState> {
    use handlers::subscription::*;
    Router::new()
        .route(
            "/subscriptions/c/{channelId}",
            post(toggle_subscription).get(channel_subscribers),
        )
        .route("/subscriptions/u/{subscriberId}", get(subscribed_channels))
}

fn tweet_routes() -> Router<AppState> {
    use handlers::tweet::*;
    Router::new()
        .route("/tweets", post(create_tweet))
        .route("/tweets/user/{userId}", get(user_tweets))
        .route("/tweets/{tweetId}", patch(update_tweet).delete(delete_tweet))
}

fn dashboard_routes() -> Router<AppState> {
    use handlers::dashboard::*;
    Router::new()
        .route("/dashboard/stats", get(channel_stats))
        .route("/dashboard/videos", get(channel_videos))
}
