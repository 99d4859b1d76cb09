//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.
//!
//! Repositories scope every mutation by `(id, owner)`: a record owned by
//! someone else is reported exactly like a missing one (`None` / `false`).

use async_trait::async_trait;
use uuid::Uuid;

use crate::media::{MediaKind, UploadFile, UploadedAsset};
use crate::models::{
    ChannelStats, ChannelVideo, Comment, CommentView, Like, LikedVideo, Playlist, Subscription,
    Tweet, TweetView, UserSummary, Video, VideoDetail, VideoSummary, VideoUpdate,
};
use crate::pagination::{Page, PageRequest, VideoSort};

/// Filter for a paginated video listing.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoQuery {
    pub owner: Uuid,
    /// Case-insensitive substring matched against title and description.
    pub search: Option<String>,
    pub include_unpublished: bool,
    pub sort: VideoSort,
    pub page: PageRequest,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VideoRepo: Send + Sync {
    async fn insert_video(&self, video: Video) -> anyhow::Result<()>;
    async fn list_videos(&self, query: VideoQuery) -> anyhow::Result<Page<VideoSummary>>;
    /// Fetches a published video and atomically bumps its view counter.
    /// Returns the post-increment record.
    async fn view_video(&self, id: Uuid) -> anyhow::Result<Option<VideoDetail>>;
    async fn find_owned_video(&self, id: Uuid, owner: Uuid) -> anyhow::Result<Option<Video>>;
    async fn update_video_details(
        &self,
        id: Uuid,
        owner: Uuid,
        update: VideoUpdate,
    ) -> anyhow::Result<Option<Video>>;
    async fn delete_video(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool>;
    /// Flips `is_published` in place.
    async fn toggle_publish(&self, id: Uuid, owner: Uuid) -> anyhow::Result<Option<Video>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Newest first, authors joined in.
    async fn comments_for_video(
        &self,
        video: Uuid,
        page: PageRequest,
    ) -> anyhow::Result<Page<CommentView>>;
    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()>;
    async fn update_comment(
        &self,
        id: Uuid,
        owner: Uuid,
        content: String,
    ) -> anyhow::Result<Option<Comment>>;
    async fn delete_comment(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LikeRepo: Send + Sync {
    /// Removes the like on `(target, liked_by)` if present, otherwise stores
    /// `like`. Returns whether the pair is liked afterwards. Implementations
    /// must make this atomic per pair.
    async fn toggle_like(&self, like: Like) -> anyhow::Result<bool>;
    /// Most recently liked first. Likes whose video is gone are skipped.
    async fn liked_videos(&self, user: Uuid) -> anyhow::Result<Vec<LikedVideo>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PlaylistRepo: Send + Sync {
    async fn insert_playlist(&self, playlist: Playlist) -> anyhow::Result<()>;
    /// Newest first.
    async fn playlists_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Playlist>>;
    async fn find_playlist(&self, id: Uuid) -> anyhow::Result<Option<Playlist>>;
    async fn update_playlist(
        &self,
        id: Uuid,
        owner: Uuid,
        name: String,
        description: String,
    ) -> anyhow::Result<Option<Playlist>>;
    async fn delete_playlist(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool>;
    /// Set-union add; adding a present video is a no-op.
    async fn add_playlist_video(
        &self,
        id: Uuid,
        owner: Uuid,
        video: Uuid,
    ) -> anyhow::Result<Option<Playlist>>;
    async fn remove_playlist_video(
        &self,
        id: Uuid,
        owner: Uuid,
        video: Uuid,
    ) -> anyhow::Result<Option<Playlist>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Same contract as [`LikeRepo::toggle_like`], keyed by
    /// `(subscriber, channel)`.
    async fn toggle_subscription(&self, subscription: Subscription) -> anyhow::Result<bool>;
    /// Newest first.
    async fn subscribers(&self, channel: Uuid) -> anyhow::Result<Vec<UserSummary>>;
    /// Newest first.
    async fn subscribed_channels(&self, subscriber: Uuid) -> anyhow::Result<Vec<UserSummary>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TweetRepo: Send + Sync {
    async fn insert_tweet(&self, tweet: Tweet) -> anyhow::Result<()>;
    /// Newest first, author joined in.
    async fn tweets_by_owner(&self, owner: Uuid, page: PageRequest)
        -> anyhow::Result<Page<TweetView>>;
    async fn update_tweet(
        &self,
        id: Uuid,
        owner: Uuid,
        content: String,
    ) -> anyhow::Result<Option<Tweet>>;
    async fn delete_tweet(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DashboardRepo: Send + Sync {
    /// All counters are zero for a channel with no activity.
    async fn channel_stats(&self, channel: Uuid) -> anyhow::Result<ChannelStats>;
    /// Every video of the channel, drafts included, newest first.
    async fn channel_videos(&self, channel: Uuid) -> anyhow::Result<Vec<ChannelVideo>>;
}

/// Media storage contract for uploads handed off to the asset host.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores the file and returns its durable URL and host metadata.
    async fn upload(&self, file: UploadFile, kind: MediaKind) -> anyhow::Result<UploadedAsset>;
    /// Deletes an asset by the id derived from its URL.
    async fn delete(&self, asset_id: &str, kind: MediaKind) -> anyhow::Result<()>;
}

/// Identity contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthProvider: Send + Sync {
    /// Resolves an access token to the acting user's id.
    fn verify_access_token(&self, token: &str) -> anyhow::Result<Uuid>;
}
