//! End-to-end tests: the full router over an in-memory SQLite store, real
//! JWT verification and a mocked media host.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use vt_api::{app, AppState, HttpOptions};
use vt_auth_jwt::JwtAuthProvider;
use vt_core::traits::{MockMediaStore, VideoRepo};
use vt_core::{MediaKind, UploadedAsset, Video};
use vt_db_sqlite::{SqliteStore, UserRecord};

const BOUNDARY: &str = "vtube-test-boundary";

struct TestApp {
    router: Router,
    store: SqliteStore,
    auth: JwtAuthProvider,
}

impl TestApp {
    async fn new(media: MockMediaStore) -> Self {
        let secret = SecretString::from("integration-secret");
        let store = SqliteStore::new("sqlite::memory:").await.unwrap();
        let state = AppState::with_store(
            store.clone(),
            Arc::new(media),
            Arc::new(JwtAuthProvider::new(&secret)),
        );
        Self {
            router: app(state, &HttpOptions::default()),
            store,
            auth: JwtAuthProvider::new(&secret),
        }
    }

    async fn user(&self, username: &str) -> (Uuid, String) {
        let id = Uuid::now_v7();
        self.store
            .insert_user(&UserRecord {
                id,
                username: username.to_string(),
                email: format!("{username}@example.com"),
                avatar: format!("https://cdn.test/avatars/{username}.png"),
            })
            .await
            .unwrap();
        let token = self.auth.issue_access_token(id, Duration::minutes(10)).unwrap();
        (id, token)
    }

    async fn video(&self, owner: Uuid, title: &str, views: i64, published: bool) -> Video {
        let now = Utc::now();
        let video = Video {
            id: Uuid::now_v7(),
            video_file: format!("https://cdn.test/video/upload/{title}.mp4"),
            thumbnail: format!("https://cdn.test/image/upload/{title}.png"),
            title: title.to_string(),
            description: format!("about {title}"),
            duration: 42.0,
            views,
            is_published: published,
            owner,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_video(video.clone()).await.unwrap();
        video
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.send(json_request(method, uri, token, body)).await
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

fn multipart_request(method: Method, uri: &str, cookie_token: Option<&str>, parts: &[Part]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, content_type, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(token) = cookie_token {
        builder = builder.header(header::COOKIE, format!("accessToken={token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (status, body) = app.call(Method::GET, "/api/v1/healthcheck", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "OK");
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 200);
}

#[tokio::test]
async fn actor_is_checked_before_ids_and_fields() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (_, token) = app.user("ana").await;

    let (status, body) = app
        .call(Method::POST, "/api/v1/comments/not-an-id", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());

    let (status, body) = app
        .call(Method::POST, "/api/v1/comments/not-an-id", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid videoId");

    let video = Uuid::now_v7();
    let (status, body) = app
        .call(Method::POST, &format!("/api/v1/comments/{video}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Comment content required");
}

#[tokio::test]
async fn expired_token_is_anonymous() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (id, _) = app.user("ana").await;
    let stale = app.auth.issue_access_token(id, Duration::minutes(-5)).unwrap();

    let (status, _) = app.call(Method::GET, "/api/v1/likes/videos", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn comment_lifecycle_is_owner_scoped() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (_, ana) = app.user("ana").await;
    let (_, bo) = app.user("bo").await;
    let video = app.video(Uuid::now_v7(), "intro", 0, true).await;

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/v1/comments/{}", video.id),
            Some(&ana),
            Some(json!({ "content": "  first!  " })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"], "first!");
    let comment_id = body["data"]["_id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/comments/c/{comment_id}");
    let (status, _) = app
        .call(Method::PATCH, &uri, Some(&bo), Some(json!({ "content": "hijacked" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&bo), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(Method::PATCH, &uri, Some(&ana), Some(json!({ "content": "edited" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "edited");

    let (status, body) = app
        .call(Method::GET, &format!("/api/v1/comments/{}?page=1&limit=5", video.id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["content"], "edited");
    assert_eq!(body["data"]["items"][0]["owner"]["username"], "ana");
    assert!(body["data"]["items"][0]["owner"].get("email").is_none());

    let (status, _) = app.call(Method::DELETE, &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app
        .call(Method::GET, &format!("/api/v1/comments/{}", video.id), None, None)
        .await;
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["totalPages"], 1);
}

#[tokio::test]
async fn like_toggles_and_lists_liked_videos() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (_, ana) = app.user("ana").await;
    let video = app.video(Uuid::now_v7(), "clip", 3, true).await;
    let uri = format!("/api/v1/likes/toggle/v/{}", video.id);

    let (status, body) = app.call(Method::POST, &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isLiked"], true);
    assert_eq!(body["message"], "Video liked successfully");

    let (_, body) = app.call(Method::GET, "/api/v1/likes/videos", Some(&ana), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "clip");

    let (_, body) = app.call(Method::POST, &uri, Some(&ana), None).await;
    assert_eq!(body["data"]["isLiked"], false);
    assert_eq!(body["message"], "Video unliked successfully");

    let (_, body) = app.call(Method::GET, "/api/v1/likes/videos", Some(&ana), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = app
        .call(Method::POST, "/api/v1/likes/toggle/t/nope", Some(&ana), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid tweetId");
}

#[tokio::test]
async fn subscriptions_toggle_and_list_both_ways() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (ana_id, ana) = app.user("ana").await;
    let (bo_id, _) = app.user("bo").await;

    let (status, body) = app
        .call(Method::POST, &format!("/api/v1/subscriptions/c/{ana_id}"), Some(&ana), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot subscribe to yourself");

    let channel_uri = format!("/api/v1/subscriptions/c/{bo_id}");
    let (status, body) = app.call(Method::POST, &channel_uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isSubscribed"], true);

    let (_, body) = app.call(Method::GET, &channel_uri, None, None).await;
    assert_eq!(body["data"][0]["username"], "ana");

    let (_, body) = app
        .call(Method::GET, &format!("/api/v1/subscriptions/u/{ana_id}"), None, None)
        .await;
    assert_eq!(body["data"][0]["username"], "bo");

    let (_, body) = app.call(Method::POST, &channel_uri, Some(&ana), None).await;
    assert_eq!(body["data"]["isSubscribed"], false);
    let (_, body) = app.call(Method::GET, &channel_uri, None, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn playlist_membership_is_a_set_and_owner_only() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (ana_id, ana) = app.user("ana").await;
    let (_, bo) = app.user("bo").await;
    let first = app.video(ana_id, "one", 0, true).await;
    let second = app.video(ana_id, "two", 0, true).await;

    let (status, body) = app
        .call(Method::POST, "/api/v1/playlist", Some(&ana), Some(json!({ "name": "Mix" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["description"], "");
    let playlist = body["data"]["_id"].as_str().unwrap().to_string();

    for video in [&first, &first, &second] {
        let (status, _) = app
            .call(
                Method::PATCH,
                &format!("/api/v1/playlist/add/{}/{playlist}", video.id),
                Some(&ana),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = app
        .call(Method::GET, &format!("/api/v1/playlist/{playlist}"), None, None)
        .await;
    assert_eq!(
        body["data"]["videos"],
        json!([first.id.to_string(), second.id.to_string()])
    );

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/playlist/remove/{}/{playlist}", first.id),
            Some(&bo),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/playlist/remove/{}/{playlist}", first.id),
            Some(&ana),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["videos"], json!([second.id.to_string()]));

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/playlist/{playlist}"),
            Some(&ana),
            Some(json!({ "name": "Renamed", "description": "best of" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");

    let (_, body) = app
        .call(Method::GET, &format!("/api/v1/playlist/user/{ana_id}"), None, None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/playlist/{playlist}"), Some(&ana), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .call(Method::GET, &format!("/api/v1/playlist/{playlist}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tweets_page_and_hide_foreign_edits() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (ana_id, ana) = app.user("ana").await;
    let (_, bo) = app.user("bo").await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let (status, body) = app
            .call(
                Method::POST,
                "/api/v1/tweets",
                Some(&ana),
                Some(json!({ "content": format!("tweet {n}") })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["data"]["_id"].as_str().unwrap().to_string());
    }

    let (_, body) = app
        .call(Method::GET, &format!("/api/v1/tweets/user/{ana_id}?page=2&limit=2"), None, None)
        .await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["items"][0]["content"], "tweet 0");

    let uri = format!("/api/v1/tweets/{}", ids[0]);
    let (status, _) = app
        .call(Method::PATCH, &uri, Some(&bo), Some(json!({ "content": "mine now" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&bo), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn dashboard_aggregates_the_actors_channel() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (ana_id, ana) = app.user("ana").await;
    let (_, bo) = app.user("bo").await;
    let public = app.video(ana_id, "public", 10, true).await;
    app.video(ana_id, "draft", 5, false).await;

    app.call(Method::POST, &format!("/api/v1/likes/toggle/v/{}", public.id), Some(&bo), None)
        .await;
    app.call(Method::POST, &format!("/api/v1/subscriptions/c/{ana_id}"), Some(&bo), None)
        .await;

    let (status, body) = app.call(Method::GET, "/api/v1/dashboard/stats", Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "totalVideos": 2, "totalViews": 15, "totalLikes": 1, "totalSubscribers": 1 })
    );

    let (_, body) = app.call(Method::GET, "/api/v1/dashboard/videos", Some(&ana), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = app.call(Method::GET, "/api/v1/dashboard/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn publish_uploads_both_files_and_counts_views() {
    let mut media = MockMediaStore::new();
    media
        .expect_upload()
        .withf(|file, kind| *kind == MediaKind::Video && file.file_name == "clip.mp4")
        .times(1)
        .returning(|_, _| {
            Ok(UploadedAsset {
                url: "https://cdn.test/video/upload/vid1.mp4".into(),
                public_id: "vid1".into(),
                duration: Some(12.5),
            })
        });
    media
        .expect_upload()
        .withf(|_, kind| *kind == MediaKind::Image)
        .times(1)
        .returning(|_, _| {
            Ok(UploadedAsset {
                url: "https://cdn.test/image/upload/img1.png".into(),
                public_id: "img1".into(),
                duration: None,
            })
        });
    let app = TestApp::new(media).await;
    let (ana_id, ana) = app.user("ana").await;

    let request = multipart_request(
        Method::POST,
        "/api/v1/videos",
        Some(&ana),
        &[
            Part::Text("title", "My clip"),
            Part::Text("description", "Shot on a phone"),
            Part::File("videoFile", "clip.mp4", "video/mp4", b"\x00\x00\x00\x18ftypmp42"),
            Part::File("thumbnail", "thumb.png", "image/png", b"\x89PNG"),
        ],
    );
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["duration"], 12.5);
    assert_eq!(body["data"]["owner"], json!(ana_id.to_string()));
    let id = body["data"]["_id"].as_str().unwrap().to_string();
    let created_at = body["data"]["createdAt"].clone();

    let (status, body) = app.call(Method::GET, &format!("/api/v1/videos/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["views"], 1);
    assert_eq!(body["data"]["createdAt"], created_at);
    assert_eq!(body["data"]["owner"]["username"], "ana");
}

#[tokio::test]
async fn publish_without_actor_uploads_nothing() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let request = multipart_request(
        Method::POST,
        "/api/v1/videos",
        None,
        &[
            Part::Text("title", "t"),
            Part::Text("description", "d"),
            Part::File("videoFile", "clip.mp4", "video/mp4", b"data"),
            Part::File("thumbnail", "thumb.png", "image/png", b"data"),
        ],
    );
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn publish_requires_both_files() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (_, ana) = app.user("ana").await;
    let request = multipart_request(
        Method::POST,
        "/api/v1/videos",
        Some(&ana),
        &[
            Part::Text("title", "t"),
            Part::Text("description", "d"),
            Part::File("thumbnail", "thumb.png", "image/png", b"data"),
        ],
    );
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Video file is required");
}

#[tokio::test]
async fn update_swaps_thumbnail_and_purges_the_old_one() {
    let mut media = MockMediaStore::new();
    media
        .expect_upload()
        .withf(|_, kind| *kind == MediaKind::Image)
        .times(1)
        .returning(|_, _| {
            Ok(UploadedAsset {
                url: "https://cdn.test/image/upload/fresh.png".into(),
                public_id: "fresh".into(),
                duration: None,
            })
        });
    media
        .expect_delete()
        .withf(|asset_id, kind| asset_id == "intro" && *kind == MediaKind::Image)
        .times(1)
        .returning(|_, _| Ok(()));
    let app = TestApp::new(media).await;
    let (ana_id, ana) = app.user("ana").await;
    let video = app.video(ana_id, "intro", 0, true).await;

    let request = multipart_request(
        Method::PATCH,
        &format!("/api/v1/videos/{}", video.id),
        Some(&ana),
        &[
            Part::Text("title", "Intro v2"),
            Part::Text("description", "recut"),
            Part::File("thumbnail", "new.png", "image/png", b"\x89PNG"),
        ],
    );
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["thumbnail"], "https://cdn.test/image/upload/fresh.png");
    assert_eq!(body["data"]["title"], "Intro v2");
}

#[tokio::test]
async fn foreign_video_update_uploads_nothing() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (ana_id, _) = app.user("ana").await;
    let (_, bo) = app.user("bo").await;
    let video = app.video(ana_id, "intro", 0, true).await;

    let request = multipart_request(
        Method::PATCH,
        &format!("/api/v1/videos/{}", video.id),
        Some(&bo),
        &[
            Part::Text("title", "stolen"),
            Part::Text("description", "d"),
            Part::File("thumbnail", "new.png", "image/png", b"\x89PNG"),
        ],
    );
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drafts_are_listed_only_for_their_owner() {
    let app = TestApp::new(MockMediaStore::new()).await;
    let (ana_id, ana) = app.user("ana").await;
    app.video(ana_id, "live", 0, true).await;
    let draft = app.video(ana_id, "draft", 0, false).await;

    let uri = format!("/api/v1/videos?userId={ana_id}&sortBy=createdAt&sortType=asc");
    let (_, body) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = app.call(Method::GET, &uri, Some(&ana), None).await;
    assert_eq!(body["data"]["total"], 2);

    let (status, _) = app
        .call(Method::GET, &format!("/api/v1/videos/{}", draft.id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/videos/toggle/publish/{}", draft.id),
            Some(&ana),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Video is now public");

    let (status, _) = app.call(Method::GET, "/api/v1/videos", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
