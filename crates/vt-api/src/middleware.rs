//! Middleware applied around every route.
//!
//! Request tracing, CORS and the upload size cap.

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// `*` or a comma-separated list of origins.
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            cors_origin: "*".to_string(),
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

pub fn apply(router: Router, options: &HttpOptions) -> Router {
    router
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(cors_policy(&options.cors_origin))
        .layer(TraceLayer::new_for_http())
}

/// Any origin without credentials for `*`; otherwise the listed origins
/// with cookies allowed.
pub fn cors_policy(origin: &str) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origin.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));
    }

    let origins: Vec<HeaderValue> = origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = o, "skipping unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
