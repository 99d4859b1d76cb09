use std::sync::Arc;

use vt_core::traits::{
    AuthProvider, CommentRepo, DashboardRepo, LikeRepo, MediaStore, PlaylistRepo,
    SubscriptionRepo, TweetRepo, VideoRepo,
};

/// State shared across all request handlers. Each port is held behind a
/// trait object so the binary can pick adapters at startup.
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub likes: Arc<dyn LikeRepo>,
    pub playlists: Arc<dyn PlaylistRepo>,
    pub subscriptions: Arc<dyn SubscriptionRepo>,
    pub tweets: Arc<dyn TweetRepo>,
    pub dashboard: Arc<dyn DashboardRepo>,
    pub media: Arc<dyn MediaStore>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Wires every repository port to one store that implements them all.
    pub fn with_store<S>(store: S, media: Arc<dyn MediaStore>, auth: Arc<dyn AuthProvider>) -> Self
    where
        S: VideoRepo
            + CommentRepo
            + LikeRepo
            + PlaylistRepo
            + SubscriptionRepo
            + TweetRepo
            + DashboardRepo
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            videos: store.clone(),
            comments: store.clone(),
            likes: store.clone(),
            playlists: store.clone(),
            subscriptions: store.clone(),
            tweets: store.clone(),
            dashboard: store,
            media,
            auth,
        }
    }
}
