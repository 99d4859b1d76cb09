//! # vtube binary
//!
//! The entry point that assembles the server from the adapters enabled at
//! compile time and the settings loaded at startup.

use std::sync::Arc;

use anyhow::{bail, Context};
use axum::Router;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use vt_api::{AppState, HttpOptions};
use vt_config::{MediaBackend, MediaSettings, Settings};
use vt_core::traits::MediaStore;

#[cfg(feature = "db-sqlite")]
use vt_db_sqlite::SqliteStore;

#[cfg(feature = "auth-jwt")]
use vt_auth_jwt::JwtAuthProvider;

#[cfg(not(all(feature = "db-sqlite", feature = "auth-jwt")))]
compile_error!("vtube needs the `db-sqlite` and `auth-jwt` features");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(settings.log.json);

    let addr = settings.bind_addr();
    let Settings {
        server,
        database,
        media,
        auth,
        ..
    } = settings;

    let store = SqliteStore::connect(&database.url, database.max_connections)
        .await
        .context("opening database")?;
    let auth = JwtAuthProvider::new(&auth.access_token_secret);
    let (media_store, static_files) = media_store(media)?;

    let state = AppState::with_store(store, media_store, Arc::new(auth));
    let options = HttpOptions {
        cors_origin: server.cors_origin,
        max_upload_bytes: server.max_upload_bytes,
    };
    let app = with_static_files(vt_api::app(state, &options), static_files);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    tracing::info!(%addr, "vtube listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running API server")?;

    tracing::info!("vtube stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Where the local backend keeps files and the URL prefix they are served
/// under. `None` when the media host serves its own URLs. A prefix that is
/// an absolute URL points at another server and is not mounted here.
type StaticFiles = Option<(std::path::PathBuf, String)>;

fn media_store(media: MediaSettings) -> anyhow::Result<(Arc<dyn MediaStore>, StaticFiles)> {
    match media.backend {
        #[cfg(feature = "storage-local")]
        MediaBackend::Local => {
            let local = media.local;
            std::fs::create_dir_all(&local.root)
                .with_context(|| format!("creating media root {}", local.root.display()))?;
            let store = vt_storage_local::LocalMediaStore::new(local.root.clone(), local.url_prefix.clone());
            tracing::info!(root = %local.root.display(), prefix = %local.url_prefix, "local media store");
            Ok((Arc::new(store), Some((local.root, local.url_prefix))))
        }
        #[cfg(feature = "storage-cloudinary")]
        MediaBackend::Cloudinary => {
            let Some(creds) = media.cloudinary else {
                bail!("media.cloudinary is not configured");
            };
            tracing::info!(cloud = %creds.cloud_name, "cloudinary media store");
            let store = vt_storage_cloudinary::CloudinaryMediaStore::new(
                creds.cloud_name,
                creds.api_key,
                creds.api_secret,
            );
            Ok((Arc::new(store), None))
        }
        #[allow(unreachable_patterns)]
        backend => bail!("media backend {backend:?} is not compiled into this build"),
    }
}

#[cfg(feature = "storage-local")]
fn with_static_files(app: Router, static_files: StaticFiles) -> Router {
    match static_files {
        Some((root, prefix)) if prefix.starts_with('/') => {
            app.nest_service(&prefix, tower_http::services::ServeDir::new(root))
        }
        _ => app,
    }
}

#[cfg(not(feature = "storage-local"))]
fn with_static_files(app: Router, _static_files: StaticFiles) -> Router {
    app
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
    }
}
