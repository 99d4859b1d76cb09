//! # Domain Models
//!
//! These structs represent the core entities of the video platform.
//! We use UUID v7 for time-ordered, globally unique identification.
//!
//! Field names serialize in camelCase with the identifier exposed as `_id`,
//! which is the wire shape existing clients expect.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public projection of a user, used wherever an owner, subscriber or
/// channel is joined into a response.
/// The current time at microsecond precision, which is what stores keep.
/// A record built from it reads back with the same timestamps.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
}

/// A published (or draft) video. `video_file` and `thumbnail` are URLs
/// returned by the `MediaStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    /// Seconds, as reported by the media host.
    pub duration: f64,
    /// Incremented every time the video is fetched by id.
    pub views: i64,
    pub is_published: bool,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A video with its owner joined in, returned by the single-video fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List item for paginated video listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub owner: Option<UserSummary>,
}

/// A video as listed on its owner's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideo {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// A video as listed in a user's "liked videos".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub owner: Option<UserSummary>,
}

/// Fields replaced by a video update.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoUpdate {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub content: String,
    pub video: Uuid,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment with its author joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner: Option<UserSummary>,
}

/// What a like points at. Exactly one target per like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeKind {
    Video,
    Comment,
    Tweet,
}

impl LikeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LikeKind::Video => "video",
            LikeKind::Comment => "comment",
            LikeKind::Tweet => "tweet",
        }
    }

    /// Name of the path parameter carrying the target id.
    pub fn id_param(self) -> &'static str {
        match self {
            LikeKind::Video => "videoId",
            LikeKind::Comment => "commentId",
            LikeKind::Tweet => "tweetId",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeTarget {
    pub kind: LikeKind,
    pub target_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub target: LikeTarget,
    pub liked_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Insertion-ordered, duplicate-free.
    pub videos: Vec<Uuid>,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub subscriber: Uuid,
    /// The channel is itself a user.
    pub channel: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub content: String,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tweet with its author joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Option<UserSummary>,
}

/// Snapshot of a channel's totals for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}
