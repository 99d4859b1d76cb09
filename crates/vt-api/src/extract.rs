//! Request extractors.
//!
//! None of these reject a request. Missing or malformed input becomes an
//! empty value so the service layer reports errors in its own order:
//! actor, then identifiers, then fields.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;
use vt_core::pagination::{PageRequest, VideoSort};
use vt_core::services::video::ListVideos;
use vt_core::{AppError, UploadFile};

use crate::response::ApiError;
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// The authenticated user, if the request carries a valid access token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor(pub Option<Uuid>);

impl FromRequestParts<AppState> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = access_token(parts) else {
            return Ok(Actor(None));
        };
        match state.auth.verify_access_token(&token) {
            Ok(user) => Ok(Actor(Some(user))),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring invalid access token");
                Ok(Actor(None))
            }
        }
    }
}

/// Cookie first, then `Authorization: Bearer`.
fn access_token(parts: &Parts) -> Option<String> {
    let from_cookie = parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.to_string());

    from_cookie.filter(|t| !t.is_empty()).or_else(|| {
        parts
            .headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// `?page&limit`, kept as raw strings so junk falls back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref(), self.limit.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListQuery {
    pub user_id: Option<String>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl From<VideoListQuery> for ListVideos {
    fn from(q: VideoListQuery) -> Self {
        ListVideos {
            sort: VideoSort::parse(q.sort_by.as_deref(), q.sort_type.as_deref()),
            page: PageRequest::parse(q.page.as_deref(), q.limit.as_deref()),
            user_id: q.user_id,
            query: q.query,
        }
    }
}

/// A JSON body whose parse failure degrades to `T::default()`.
#[derive(Debug, Default)]
pub struct Body<T>(pub T);

impl<S, T> FromRequest<S> for Body<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Body(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "unreadable JSON body treated as empty");
                Ok(Body(T::default()))
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentBody {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaylistBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Text fields and files of a multipart form, keyed by field name.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, UploadFile>,
}

impl FormData {
    /// Reads the whole form. A request that is not multipart at all yields an
    /// empty form; a body that breaks mid-stream is a 400.
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ApiError> {
        let mut form = FormData::default();
        let Ok(mut multipart) = multipart else {
            return Ok(form);
        };

        while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.map_err(bad_form)?;
                    if !data.is_empty() {
                        form.files
                            .insert(name, UploadFile::new(file_name, content_type, data));
                    }
                }
                None => {
                    let text = field.text().await.map_err(bad_form)?;
                    form.texts.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.texts.get(name).cloned()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadFile> {
        self.files.remove(name)
    }
}

fn bad_form(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError(AppError::ValidationFailed(format!("Malformed form data: {}", err.body_text())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = HttpRequest::builder().uri("/");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let p = parts(&[
            ("cookie", "theme=dark; accessToken=abc.def; other=1"),
            ("authorization", "Bearer xyz"),
        ]);
        assert_eq!(access_token(&p).as_deref(), Some("abc.def"));
    }

    #[test]
    fn bearer_used_without_cookie() {
        let p = parts(&[("authorization", "Bearer xyz")]);
        assert_eq!(access_token(&p).as_deref(), Some("xyz"));
        let p = parts(&[("authorization", "Basic xyz")]);
        assert_eq!(access_token(&p), None);
        assert_eq!(access_token(&parts(&[])), None);
    }

    #[test]
    fn video_query_maps_to_service_input() {
        let q = VideoListQuery {
            user_id: Some("u".into()),
            sort_by: Some("views".into()),
            sort_type: Some("asc".into()),
            page: Some("2".into()),
            limit: Some("50".into()),
            ..Default::default()
        };
        let input: ListVideos = q.into();
        assert_eq!(input.user_id.as_deref(), Some("u"));
        assert_eq!(input.page.page(), 2);
        assert_eq!(input.page.limit(), 10);
        assert_eq!(input.sort, VideoSort::parse(Some("views"), Some("asc")));
    }
}
